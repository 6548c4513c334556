use std::io::Cursor;

/// EXIFのGPS情報から (緯度, 経度) を取り出す
///
/// GPSタグがない・壊れている場合は None
pub fn extract_gps(bytes: &[u8]) -> Option<(f64, f64)> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;

    let lat = exif.get_field(exif::Tag::GPSLatitude, exif::In::PRIMARY)?;
    let lng = exif.get_field(exif::Tag::GPSLongitude, exif::In::PRIMARY)?;

    let mut latitude = degrees(lat)?;
    let mut longitude = degrees(lng)?;

    // 南緯・西経は負
    if hemisphere(&exif, exif::Tag::GPSLatitudeRef) == Some(b'S') {
        latitude = -latitude;
    }
    if hemisphere(&exif, exif::Tag::GPSLongitudeRef) == Some(b'W') {
        longitude = -longitude;
    }

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some((latitude, longitude))
}

/// 度・分・秒 → 10進度
fn degrees(field: &exif::Field) -> Option<f64> {
    match &field.value {
        exif::Value::Rational(v) if v.len() >= 3 => {
            Some(v[0].to_f64() + v[1].to_f64() / 60.0 + v[2].to_f64() / 3600.0)
        }
        _ => None,
    }
}

fn hemisphere(exif: &exif::Exif, tag: exif::Tag) -> Option<u8> {
    let field = exif.get_field(tag, exif::In::PRIMARY)?;
    match &field.value {
        exif::Value::Ascii(values) => values.first().and_then(|s| s.first()).copied(),
        _ => None,
    }
}
