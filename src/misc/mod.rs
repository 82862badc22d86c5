pub mod binomial;
pub mod floating_point;

pub use binomial::*;
pub use floating_point::*;

/// Parametric direction of a tensor-product patch.
/// `U` is direction 0 (the outer index of a control net), `V` is direction 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParametricDirection {
    U,
    V,
}

impl ParametricDirection {
    /// Both directions in index order
    pub const ALL: [ParametricDirection; 2] = [ParametricDirection::U, ParametricDirection::V];

    pub fn index(&self) -> usize {
        match self {
            ParametricDirection::U => 0,
            ParametricDirection::V => 1,
        }
    }

    /// The other direction
    pub fn other(&self) -> Self {
        match self {
            ParametricDirection::U => ParametricDirection::V,
            ParametricDirection::V => ParametricDirection::U,
        }
    }
}

impl TryFrom<usize> for ParametricDirection {
    type Error = anyhow::Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(ParametricDirection::U),
            1 => Ok(ParametricDirection::V),
            _ => anyhow::bail!("A surface patch has no parametric direction {}", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ParametricDirection;

    #[test]
    fn direction_from_index() {
        assert_eq!(ParametricDirection::try_from(0).unwrap(), ParametricDirection::U);
        assert_eq!(ParametricDirection::try_from(1).unwrap(), ParametricDirection::V);
        assert!(ParametricDirection::try_from(2).is_err());
        assert_eq!(ParametricDirection::U.other(), ParametricDirection::V);
    }
}
