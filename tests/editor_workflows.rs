//! End-to-end editor workflows over both backends with real codecs
//!
//! Fixtures are synthesized in a temp directory; every dimension-sensitive
//! assertion runs against both backends to pin down behavioral parity.

use image::{GenericImageView, Rgba, RgbaImage};
use imagemill::{BackendKind, ImageEditor, ImageKind, ImageMillError};
use std::path::Path;
use tempfile::TempDir;

const BOTH_BACKENDS: [BackendKind; 2] = [BackendKind::Raster, BackendKind::Toolkit];

/// Create a small valid JPEG file with the given dimensions.
fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    image::DynamicImage::ImageRgb8(img)
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// Create a small valid PNG file with an alpha gradient.
fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 40, 200])
    });
    image::DynamicImage::ImageRgba8(img)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Create a small valid GIF file.
fn create_test_gif(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_pixel(width, height, Rgba([90, 140, 20, 255]));
    image::DynamicImage::ImageRgba8(img)
        .save_with_format(path, image::ImageFormat::Gif)
        .unwrap();
}

#[test]
fn load_reports_codec_dimensions() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.jpg");
    create_test_jpeg(&path, 200, 126);

    for backend in BOTH_BACKENDS {
        let editor = ImageEditor::open(backend, &path).unwrap();
        assert_eq!(editor.width().unwrap(), 200, "{backend}");
        assert_eq!(editor.height().unwrap(), 126, "{backend}");
        assert_eq!(editor.format().unwrap(), ImageKind::Jpeg);
        assert_eq!(editor.extension().unwrap(), "jpg");
        assert_eq!(editor.source_path().unwrap(), path.as_path());
        assert_eq!(editor.backend_kind(), backend);
    }
}

#[test]
fn load_detects_format_from_content_not_extension() {
    let tmp = TempDir::new().unwrap();
    // PNG bytes behind a .jpg name
    let path = tmp.path().join("mislabeled.jpg");
    create_test_png(&path, 40, 30);

    for backend in BOTH_BACKENDS {
        let editor = ImageEditor::open(backend, &path).unwrap();
        assert_eq!(editor.format().unwrap(), ImageKind::Png, "{backend}");
        assert_eq!(editor.extension().unwrap(), "png");
    }
}

#[test]
fn load_failures() {
    let tmp = TempDir::new().unwrap();

    let empty = tmp.path().join("empty.jpg");
    std::fs::write(&empty, b"").unwrap();

    let text = tmp.path().join("notes.png");
    std::fs::write(&text, b"this is not an image at all").unwrap();

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::new(backend).unwrap();

        assert!(matches!(
            editor.load(tmp.path().join("missing.jpg")),
            Err(ImageMillError::InputNotFound(_))
        ));
        assert!(matches!(
            editor.load(&empty),
            Err(ImageMillError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            editor.load(&text),
            Err(ImageMillError::UnsupportedFormat(_))
        ));
    }
}

#[test]
fn default_backend_is_raster() {
    let editor = ImageEditor::new(BackendKind::default()).unwrap();
    assert_eq!(editor.backend_kind(), BackendKind::Raster);
    assert!(!editor.is_loaded());
}

#[test]
fn resize_exact_ignores_aspect() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.jpg");
    create_test_jpeg(&path, 200, 126);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.resize(64, 48, false, false).unwrap();
        assert_eq!(editor.width().unwrap(), 64, "{backend}");
        assert_eq!(editor.height().unwrap(), 48, "{backend}");
    }
}

#[test]
fn aspect_resize_never_enlarges() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.jpg");
    create_test_jpeg(&path, 100, 80);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.resize(500, 400, true, false).unwrap();
        assert!(editor.width().unwrap() <= 100, "{backend}");
        assert!(editor.height().unwrap() <= 80, "{backend}");
    }
}

#[test]
fn aspect_resize_derives_other_dimension() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.jpg");
    create_test_jpeg(&path, 200, 126);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.resize(100, 0, true, false).unwrap();
        assert_eq!(editor.width().unwrap(), 100, "{backend}");
        assert_eq!(editor.height().unwrap(), 63, "{backend}");
    }
}

#[test]
fn crop_yields_exact_rectangle() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.png");
    create_test_png(&path, 100, 100);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.crop(40, 30, 10, 20).unwrap();
        assert_eq!(editor.width().unwrap(), 40, "{backend}");
        assert_eq!(editor.height().unwrap(), 30, "{backend}");

        // alpha survives a PNG crop
        let rgba = editor.copy().unwrap().to_rgba8();
        assert_eq!(rgba.get_pixel(0, 0)[3], 200);
    }
}

#[test]
fn crop_out_of_bounds_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.png");
    create_test_png(&path, 50, 50);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        assert!(editor.crop(40, 40, 20, 20).is_err(), "{backend}");
    }
}

#[test]
fn rotate_90_swaps_dimensions_and_round_trips() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.jpg");
    create_test_jpeg(&path, 200, 126);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.rotate(90.0).unwrap();
        assert_eq!(editor.width().unwrap(), 126, "{backend}");
        assert_eq!(editor.height().unwrap(), 200, "{backend}");

        editor.rotate(-90.0).unwrap();
        assert_eq!(editor.width().unwrap(), 200, "{backend}");
        assert_eq!(editor.height().unwrap(), 126, "{backend}");
    }
}

#[test]
fn rotate_arbitrary_angle_expands_canvas() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.jpg");
    create_test_jpeg(&path, 100, 50);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.rotate(30.0).unwrap();
        assert!(editor.width().unwrap() > 100, "{backend}");
        assert!(editor.height().unwrap() > 50, "{backend}");
    }
}

#[test]
fn grayscale_equalizes_channels() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.png");
    create_test_png(&path, 16, 16);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.grayscale().unwrap();

        let rgba = editor.copy().unwrap().to_rgba8();
        let pixel = rgba.get_pixel(7, 9);
        assert_eq!(pixel[0], pixel[1], "{backend}");
        assert_eq!(pixel[1], pixel[2], "{backend}");
    }
}

#[test]
fn sepia_produces_warm_tint() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.png");
    create_test_png(&path, 16, 16);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.sepia().unwrap();

        let rgba = editor.copy().unwrap().to_rgba8();
        let pixel = rgba.get_pixel(8, 8);
        // red channel leads after the (90, 60, 40) tint
        assert!(pixel[0] > pixel[2], "{backend}: {:?}", pixel);
    }
}

#[test]
fn mirror_reverses_rows() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("strip.png");
    // 2x1: distinct endpoints
    let img = RgbaImage::from_fn(2, 1, |x, _| {
        if x == 0 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    image::DynamicImage::ImageRgba8(img)
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.mirror().unwrap();
        assert_eq!(editor.width().unwrap(), 2);
        assert_eq!(editor.height().unwrap(), 1);

        let rgba = editor.copy().unwrap().to_rgba8();
        assert_eq!(rgba.get_pixel(0, 0)[2], 255, "{backend}");
        assert_eq!(rgba.get_pixel(1, 0)[0], 255, "{backend}");
    }
}

#[test]
fn flip_reverses_columns() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("column.png");
    let img = RgbaImage::from_fn(1, 2, |_, y| {
        if y == 0 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    image::DynamicImage::ImageRgba8(img)
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.flip().unwrap();

        let rgba = editor.copy().unwrap().to_rgba8();
        assert_eq!(rgba.get_pixel(0, 0)[2], 255, "{backend}");
        assert_eq!(rgba.get_pixel(0, 1)[0], 255, "{backend}");
    }
}

#[test]
fn negative_inverts_channels() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("flat.png");
    let img = RgbaImage::from_pixel(8, 8, Rgba([90, 140, 20, 255]));
    image::DynamicImage::ImageRgba8(img)
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.negative().unwrap();

        let rgba = editor.copy().unwrap().to_rgba8();
        let pixel = rgba.get_pixel(4, 4);
        assert_eq!(pixel[0], 255 - 90, "{backend}");
        assert_eq!(pixel[1], 255 - 140, "{backend}");
        assert_eq!(pixel[2], 255 - 20, "{backend}");
    }
}

#[test]
fn autorotate_is_noop_without_metadata() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("plain.jpg");
    create_test_jpeg(&path, 60, 40);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor.autorotate().unwrap();
        assert_eq!(editor.width().unwrap(), 60, "{backend}");
        assert_eq!(editor.height().unwrap(), 40, "{backend}");
    }
}

#[test]
fn save_then_load_round_trips_dimensions_and_format() {
    let tmp = TempDir::new().unwrap();

    for backend in BOTH_BACKENDS {
        for (name, maker) in [
            ("a.jpg", create_test_jpeg as fn(&Path, u32, u32)),
            ("a.png", create_test_png as fn(&Path, u32, u32)),
            ("a.gif", create_test_gif as fn(&Path, u32, u32)),
        ] {
            let source = tmp.path().join(format!("{backend}_{name}"));
            maker(&source, 120, 90);

            let mut editor = ImageEditor::open(backend, &source).unwrap();
            let format = editor.format().unwrap();

            let saved = tmp.path().join(format!("{backend}_saved_{name}"));
            editor.save(&saved, 95).unwrap();
            assert_eq!(editor.source_path().unwrap(), saved.as_path());

            let reloaded = ImageEditor::open(backend, &saved).unwrap();
            assert_eq!(reloaded.width().unwrap(), 120, "{backend} {name}");
            assert_eq!(reloaded.height().unwrap(), 90, "{backend} {name}");
            assert_eq!(reloaded.format().unwrap(), format, "{backend} {name}");
        }
    }
}

#[test]
fn save_clamps_out_of_range_quality() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.jpg");
    create_test_jpeg(&path, 50, 50);

    for backend in BOTH_BACKENDS {
        let mut editor = ImageEditor::open(backend, &path).unwrap();

        let high = tmp.path().join(format!("{backend}_high.jpg"));
        editor.save(&high, 150).unwrap();
        assert!(image::image_dimensions(&high).is_ok());

        let low = tmp.path().join(format!("{backend}_low.jpg"));
        editor.save(&low, -10).unwrap();
        assert!(image::image_dimensions(&low).is_ok());
    }
}

#[test]
fn display_emits_tagged_decodable_bytes() {
    let tmp = TempDir::new().unwrap();

    let jpeg = tmp.path().join("d.jpg");
    create_test_jpeg(&jpeg, 32, 24);
    let png = tmp.path().join("d.png");
    create_test_png(&png, 32, 24);
    let gif = tmp.path().join("d.gif");
    create_test_gif(&gif, 32, 24);

    for backend in BOTH_BACKENDS {
        for (path, expected_type) in [
            (&jpeg, "image/jpeg"),
            (&png, "image/png"),
            (&gif, "image/gif"),
        ] {
            let editor = ImageEditor::open(backend, path).unwrap();
            let payload = editor.display(90).unwrap();
            assert_eq!(payload.content_type, expected_type, "{backend}");

            let decoded = image::load_from_memory(&payload.bytes).unwrap();
            assert_eq!(decoded.dimensions(), (32, 24), "{backend}");
        }
    }
}

#[test]
fn copy_leaves_handle_untouched() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.png");
    create_test_png(&path, 48, 36);

    for backend in BOTH_BACKENDS {
        let editor = ImageEditor::open(backend, &path).unwrap();
        let copy = editor.copy().unwrap();
        assert_eq!(copy.dimensions(), (48, 36));
        // handle still loaded and intact
        assert_eq!(editor.width().unwrap(), 48);
        assert_eq!(editor.height().unwrap(), 36);
    }
}

#[test]
fn reset_empties_the_handle() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.jpg");
    create_test_jpeg(&path, 40, 40);

    let mut editor = ImageEditor::open(BackendKind::Toolkit, &path).unwrap();
    assert!(editor.is_loaded());

    editor.reset();
    assert!(!editor.is_loaded());
    assert_eq!(editor.backend_kind(), BackendKind::Raster);
    assert!(matches!(editor.width(), Err(ImageMillError::NotLoaded(_))));

    // a reset handle can be reused
    editor.load(&path).unwrap();
    assert_eq!(editor.width().unwrap(), 40);
}

#[test]
fn fluent_pipeline_produces_expected_output() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.jpg");
    create_test_jpeg(&path, 200, 126);

    for backend in BOTH_BACKENDS {
        let out = tmp.path().join(format!("{backend}_out.jpg"));
        let mut editor = ImageEditor::open(backend, &path).unwrap();
        editor
            .resize(100, 0, true, false)
            .unwrap()
            .crop(50, 40, 5, 5)
            .unwrap()
            .grayscale()
            .unwrap()
            .brightness(20)
            .unwrap()
            .save(&out, 85)
            .unwrap();

        assert_eq!(image::image_dimensions(&out).unwrap(), (50, 40), "{backend}");
    }
}
