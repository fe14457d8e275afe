use std::io::Cursor;

use super::*;
use crate::foundation::error::ErrorCode;

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 128]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_base_image_png_dimensions_and_pixels() {
    let base = decode_base_image_bytes(tiny_png()).unwrap();
    assert_eq!(base.size, PixelSize { width: 2, height: 1 });
    assert_eq!(base.encoded.mime, "image/png");
    assert_eq!(base.rgba8.as_slice(), &[255, 0, 0, 255, 0, 0, 255, 128]);
}

#[test]
fn strip_code_fences_handles_tags_and_newlines() {
    assert_eq!(strip_code_fences("```png\nAAAA\nBBBB\n```"), "AAAABBBB");
    assert_eq!(strip_code_fences("  ```json\r\nQUJD\r\n```  "), "QUJD");
    assert_eq!(strip_code_fences("```plaintext QUJD```"), "QUJD");
    assert_eq!(strip_code_fences("QUJD"), "QUJD");
}

#[test]
fn edit_response_round_trips_a_fenced_png() {
    let png = tiny_png();
    let text = format!("```png\n{}\n```", BASE64.encode(&png));
    let media = decode_edit_response(&text).unwrap();
    assert_eq!(media.mime, "image/png");
    assert_eq!(media.bytes.as_slice(), png.as_slice());
}

#[test]
fn edit_response_with_prose_is_a_decode_error() {
    let err = decode_edit_response("Sorry, I can't edit images.").unwrap_err();
    assert_eq!(err.code(), ErrorCode::Decode);
    assert_eq!(err.user_message(), INVALID_FORMAT_MESSAGE);
}

#[test]
fn edit_response_that_is_only_fences_is_empty() {
    let err = decode_edit_response("```\n```").unwrap_err();
    assert_eq!(err.code(), ErrorCode::Decode);
    assert_eq!(err.user_message(), EMPTY_RESPONSE_MESSAGE);
}

#[test]
fn edit_response_with_bad_padding_is_a_decode_error() {
    let err = decode_edit_response("A=B=").unwrap_err();
    assert_eq!(err.code(), ErrorCode::Decode);
}

#[test]
fn edit_response_that_decodes_to_non_image_bytes_is_a_decode_error() {
    let err = decode_edit_response("SGVsbG8gd29ybGQ=").unwrap_err();
    assert_eq!(err.code(), ErrorCode::Decode);
    assert_eq!(err.user_message(), INVALID_FORMAT_MESSAGE);
}
