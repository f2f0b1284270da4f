use crate::ImageFormat;

/// Appends the format's extension unless the name already carries it.
/// Idempotent: normalizing a normalized name changes nothing.
pub fn normalize_filename(name: &str, format: ImageFormat) -> String {
    let extension = format.extension();
    if name.ends_with(extension) {
        name.to_string()
    } else {
        format!("{name}{extension}")
    }
}
