//! End-to-end batch and session runs against real files on disk.

use std::path::Path;

use cvdsim_core::{
    ChannelOrder, Condition, FigureLayout, SimImage, SimulationSession, SimulatorConfig, Size,
    load_image, save_image, write_figure,
};

fn write_test_image(path: &Path) {
    let mut pixels = Vec::new();
    for y in 0..24u32 {
        for x in 0..32u32 {
            pixels.push([(x * 8) as u8, (y * 10) as u8, 128]);
        }
    }
    let image = SimImage::from_pixels(32, 24, ChannelOrder::Rgb, &pixels).unwrap();
    save_image(&image, path).unwrap();
}

fn small_config(output: &Path) -> SimulatorConfig {
    SimulatorConfig {
        output_path: output.to_path_buf(),
        cell_size: Size::new(64, 48),
        padding: 4,
        title_scale: 1,
        ..SimulatorConfig::default()
    }
}

#[test]
fn test_write_standard_figure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.png");
    let output = dir.path().join("figure.png");
    write_test_image(&input);

    let figure = write_figure(&input, &FigureLayout::standard(), &small_config(&output)).unwrap();

    let written = load_image(&output).unwrap();
    let (width, height) = figure.image().dimensions();
    assert_eq!((written.width(), written.height()), (width, height));
    assert_eq!(figure.panels().len(), 9);

    let titles: Vec<_> = figure.panels().iter().map(|p| p.title.as_str()).collect();
    assert!(titles.contains(&"Normal (Trichromatic)"));
    assert!(titles.contains(&"Tritanopia (Dichromatic)"));
}

#[test]
fn test_monochrome_panel_is_gray() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.png");
    let output = dir.path().join("figure.png");
    write_test_image(&input);

    let figure = write_figure(&input, &FigureLayout::standard(), &small_config(&output)).unwrap();
    let panel = figure
        .panels()
        .iter()
        .find(|p| p.condition == Condition::Monochrome)
        .unwrap();

    for y in panel.y..panel.y + panel.height {
        for x in panel.x..panel.x + panel.width {
            let [r, g, b] = figure.image().get_pixel(x, y).0;
            assert!(r == g && g == b, "({x}, {y}) = {:?}", [r, g, b]);
        }
    }
}

#[test]
fn test_jpeg_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.jpg");
    let output = dir.path().join("figure.png");
    write_test_image(&input);

    let layout = FigureLayout::packed(&[Condition::Normal, Condition::Protanopia], 2);
    let figure = write_figure(&input, &layout, &small_config(&output)).unwrap();
    assert_eq!(figure.panels().len(), 2);
    assert!(output.exists());
}

#[test]
fn test_session_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photo.png");
    write_test_image(&input);

    let mut session = SimulationSession::default();
    session.load(&input).unwrap();
    assert_eq!(session.status(), "Loaded: photo.png");

    session.set_selected(Condition::Deuteranopia, true);
    session.set_selected(Condition::BlueConeMonochromacy, true);
    let results = session.simulate().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].image.shape(), [24, 32, 3]);
}
