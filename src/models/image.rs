use super::{Property, PropertyImage};

/// Shown whenever a property has nothing renderable
pub const PLACEHOLDER_IMAGE: &str = "assets/placeholder-property.jpg";

/// Base64 prefixes of the formats the legacy column held
const SIGNATURES: [(&str, &str); 4] = [
    ("/9j/", "jpeg"),
    ("iVBORw0KGgo", "png"),
    ("R0lGODlh", "gif"),
    ("UklGR", "webp"),
];

/// Display order: primary image first, then ascending `orden`
pub fn sort_images(images: &mut [PropertyImage]) {
    images.sort_by_key(|img| (!img.es_principal, img.orden));
}

/// Where a property's pictures come from, in priority order
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource<'a> {
    Structured(&'a [PropertyImage]),
    Legacy(&'a str),
    Missing,
}

impl<'a> ImageSource<'a> {
    pub fn of(property: &'a Property) -> Self {
        if !property.imagenes.is_empty() {
            return ImageSource::Structured(&property.imagenes);
        }
        match property.imagen.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => ImageSource::Legacy(raw),
            _ => ImageSource::Missing,
        }
    }

    /// Renderable URLs; never empty
    pub fn urls(&self) -> Vec<String> {
        match self {
            ImageSource::Structured(images) => {
                let mut ordered = images.to_vec();
                sort_images(&mut ordered);
                ordered.into_iter().map(|img| img.url).collect()
            }
            ImageSource::Legacy(raw) => vec![legacy_to_url(raw)],
            ImageSource::Missing => vec![PLACEHOLDER_IMAGE.to_string()],
        }
    }
}

/// Resolve a property's gallery once: structured images, then the legacy
/// column, then the placeholder.
pub fn resolve_gallery(property: &Property) -> Vec<String> {
    ImageSource::of(property).urls()
}

fn legacy_to_url(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("data:") {
        return raw.to_string();
    }
    format!("data:image/{};base64,{}", detect_image_type(raw), raw)
}

/// Sniff the image format from a bare base64 payload (jpeg when unknown)
pub fn detect_image_type(base64: &str) -> &'static str {
    SIGNATURES
        .iter()
        .find(|(signature, _)| base64.starts_with(signature))
        .map(|(_, kind)| *kind)
        .unwrap_or("jpeg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{image, property};

    #[test]
    fn primary_image_comes_first_then_order() {
        let mut images = vec![
            image(1, 7, false, 2),
            image(2, 7, false, 0),
            image(3, 7, true, 5),
            image(4, 7, false, 1),
        ];
        sort_images(&mut images);

        let ids: Vec<i32> = images.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn structured_images_win_over_legacy_column() {
        let mut p = property(7);
        p.imagen = Some("https://old.example.com/x.jpg".into());
        p.imagenes = vec![image(1, 7, false, 1), image(2, 7, true, 9)];

        let gallery = resolve_gallery(&p);
        assert_eq!(gallery.len(), 2);
        assert!(gallery[0].ends_with("/7/2.jpg"));
    }

    #[test]
    fn legacy_column_is_turned_into_a_url() {
        let mut p = property(1);
        p.imagen = Some("https://old.example.com/x.jpg".into());
        assert_eq!(resolve_gallery(&p), vec!["https://old.example.com/x.jpg"]);

        p.imagen = Some("iVBORw0KGgoAAAANSUhEUg".into());
        assert_eq!(
            resolve_gallery(&p),
            vec!["data:image/png;base64,iVBORw0KGgoAAAANSUhEUg"]
        );

        p.imagen = Some("data:image/gif;base64,R0lGODlh".into());
        assert_eq!(resolve_gallery(&p), vec!["data:image/gif;base64,R0lGODlh"]);
    }

    #[test]
    fn nothing_renderable_falls_back_to_placeholder() {
        let mut p = property(1);
        assert_eq!(resolve_gallery(&p), vec![PLACEHOLDER_IMAGE]);

        p.imagen = Some("   ".into());
        assert_eq!(ImageSource::of(&p), ImageSource::Missing);
    }

    #[test]
    fn unknown_signature_defaults_to_jpeg() {
        assert_eq!(detect_image_type("/9j/4AAQ"), "jpeg");
        assert_eq!(detect_image_type("UklGRiQAAABXRUJQ"), "webp");
        assert_eq!(detect_image_type("AAAA"), "jpeg");
    }
}
