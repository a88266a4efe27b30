use super::*;
use Color as C;

fn mkimage<const W: usize, const H: usize>(data: [[Color; W]; H]) -> Image {
    let mut image = Image::new(W as u32, H as u32);
    for (y, row) in data.iter().enumerate() {
        for (x, color) in row.iter().enumerate() {
            image.set(x as u32, y as u32, *color);
        }
    }
    image
}

#[test]
fn get_set_clear() {
    let mut image = mkimage([[C::RED, C::GREEN]]);
    assert_eq!(image.resolution(), Resolution::new(2, 1));
    assert_eq!(image.get(0, 0), C::RED);
    assert_eq!(image.get(1, 0), C::GREEN);

    image.clear(C::BLUE);
    assert_eq!(image.get(0, 0), C::BLUE);
    assert_eq!(image.get(1, 0), C::BLUE);
    assert_eq!(Image::new(1, 1).get(0, 0), C::NULL);
}

#[test]
fn color_components() {
    let color = C::from_rgb8(1, 2, 3).with_alpha(4);
    assert_eq!([color.r(), color.g(), color.b(), color.a()], [1, 2, 3, 4]);
    assert_eq!(color[2], 3);
    assert_eq!(format!("{color:?}"), "#01020304");
}

#[test]
fn filled_circle() {
    let mut image = Image::new(16, 16);
    draw_circle(&mut image, 8, 8).radius(3).color(C::GREEN);

    assert_eq!(image.get(8, 8), C::GREEN);
    assert_eq!(image.get(8, 5), C::GREEN);
    assert_eq!(image.get(11, 8), C::GREEN);
    assert_eq!(image.get(8, 13), C::NULL);
    assert_eq!(image.get(0, 0), C::NULL);
}

#[test]
fn outlined_circle() {
    let mut image = Image::new(16, 16);
    draw_circle(&mut image, 8, 8).radius(3).outline();

    assert_eq!(image.get(8, 8), C::NULL);
    assert_eq!(image.get(8, 5), C::RED);
}

#[test]
fn line_with_width() {
    let mut image = Image::new(16, 16);
    draw_line(&mut image, 2, 8, 13, 8)
        .color(C::WHITE)
        .stroke_width(3);

    for x in 3..=12 {
        assert_eq!(image.get(x, 7), C::WHITE, "x={x}");
        assert_eq!(image.get(x, 8), C::WHITE, "x={x}");
        assert_eq!(image.get(x, 9), C::WHITE, "x={x}");
    }
    assert_eq!(image.get(8, 5), C::NULL);
}

#[test]
fn drawing_is_clipped() {
    let mut image = Image::new(4, 4);
    draw_circle(&mut image, -2, -2).radius(3);
    draw_line(&mut image, -10, 1, 10, 1);
    assert_eq!(image.get(0, 0), C::RED);
    assert_eq!(image.get(3, 1), C::from_rgb8(0, 0, 255));
}

#[test]
fn unsupported_extension() {
    let err = Image::load("pose.bmp").unwrap_err().to_string();
    assert!(err.contains("pose.bmp"), "{err}");
    assert!(Image::new(1, 1).save("pose.gif").is_err());
}

#[test]
fn png_roundtrip() {
    let path = std::env::temp_dir().join(format!("posegraph-{}.png", std::process::id()));
    let image = mkimage([[C::RED, C::GREEN.with_alpha(7)], [C::BLUE, C::WHITE]]);
    image.save(&path).unwrap();

    let loaded = Image::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded.resolution(), image.resolution());
    assert_eq!(loaded.get(1, 0), C::GREEN.with_alpha(7));
    assert_eq!(loaded.get(0, 1), C::BLUE);
}
