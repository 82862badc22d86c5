/// Options for rendering a figure
#[derive(Clone, Debug, PartialEq)]
pub struct PlotOptions {
    /// Width of the figure in pixels
    pub width: f64,
    /// Height of the figure in pixels
    pub height: f64,
    /// Space between the figure border and the plot area in pixels
    pub margin: f64,
    /// Approximate number of ticks per axis
    pub ticks: usize,
    pub label_font_size: f64,
    pub tick_font_size: f64,
    pub legend_font_size: f64,
    /// Gray level of the grid lines, 0 is black and 1 is white
    pub grid_gray: f64,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 640.,
            height: 480.,
            margin: 64.,
            ticks: 6,
            label_font_size: 16.,
            tick_font_size: 14.,
            legend_font_size: 14.,
            grid_gray: 0.85,
        }
    }
}

impl PlotOptions {
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_ticks(mut self, ticks: usize) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn with_grid_gray(mut self, gray: f64) -> Self {
        self.grid_gray = gray;
        self
    }

    /// Check that the plot area is not empty
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.width > 2. * self.margin && self.height > 2. * self.margin,
            "Figure of {} x {} leaves no room inside a margin of {}",
            self.width,
            self.height,
            self.margin
        );
        anyhow::ensure!(self.ticks > 0, "At least one tick per axis is required");
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.grid_gray),
            "Grid gray level {} is outside [0, 1]",
            self.grid_gray
        );
        Ok(())
    }
}
