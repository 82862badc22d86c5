use isobench::prelude::*;

#[test]
fn plot_is_written_and_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("load_displacement.svg");

    let reference = cantilever_beam_reference(1.0, 1.0);
    let computed = LoadDisplacementSeries::try_new(
        reference.load_factors.clone(),
        reference.horizontal.iter().map(|u| u * 1.01).collect(),
        reference.vertical.iter().map(|w| w * 0.99).collect(),
    )
    .unwrap();

    load_displacement(&reference, &computed, &path, &PlotOptions::default()).unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));
    assert_eq!(svg.matches("<polyline").count(), 4);
}

#[test]
fn missing_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("plot.svg");
    let reference = cantilever_beam_reference(1.0, 1.0);
    let computed = LoadDisplacementSeries::try_new(vec![], vec![], vec![]).unwrap();
    let err = load_displacement(&reference, &computed, &path, &PlotOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("Failed to create plot file"));
}
