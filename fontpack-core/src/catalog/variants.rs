//! Variant naming and selection
//!
//! The catalog names variants `regular`, `italic`, `700`, `700italic`.
//! Bundling and CSS need numeric weights.

/// Variant preference for direct installs
pub const VARIANT_PREFERENCE: &[&str] = &["regular", "400", "500", "600", "700", "bold"];

/// Numeric weight of a variant label
pub fn weight_of(variant: &str) -> Option<u16> {
    match variant.to_lowercase().as_str() {
        "regular" | "italic" | "normal" => Some(400),
        "bold" => Some(700),
        other => {
            let digits: String = other.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        }
    }
}

/// Whether a variant label names an italic style
pub fn is_italic(variant: &str) -> bool {
    variant.to_lowercase().ends_with("italic")
}

/// Canonical label for a weight and style; 400 is `regular`
pub fn variant_label(weight: u16, italic: bool) -> String {
    match (weight, italic) {
        (400, false) => "regular".to_string(),
        (400, true) => "italic".to_string(),
        (w, false) => w.to_string(),
        (w, true) => format!("{w}italic"),
    }
}

/// Canonicalize a requested label (`400` → `regular`, `bold` → `700`)
pub fn canonical_variant(variant: &str) -> Option<String> {
    weight_of(variant).map(|w| variant_label(w, is_italic(variant)))
}

/// Pick up to `cap` variants from `available`, in preference order
pub fn select_variants(available: &[String], cap: usize) -> Vec<String> {
    VARIANT_PREFERENCE
        .iter()
        .filter(|preferred| available.iter().any(|a| a == *preferred))
        .take(cap)
        .map(|v| v.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_weight_of() {
        assert_eq!(weight_of("regular"), Some(400));
        assert_eq!(weight_of("bold"), Some(700));
        assert_eq!(weight_of("600"), Some(600));
        assert_eq!(weight_of("700italic"), Some(700));
        assert_eq!(weight_of("wide"), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(variant_label(400, false), "regular");
        assert_eq!(variant_label(700, true), "700italic");
        assert_eq!(canonical_variant("400").as_deref(), Some("regular"));
        assert_eq!(canonical_variant("bold").as_deref(), Some("700"));
    }

    #[test]
    fn test_select_variants_capped_in_preference_order() {
        let available = strings(&["100", "700", "500", "regular", "600", "900"]);
        assert_eq!(select_variants(&available, 3), strings(&["regular", "500", "600"]));
    }

    #[test]
    fn test_select_variants_only_available() {
        let available = strings(&["300", "700"]);
        assert_eq!(select_variants(&available, 3), strings(&["700"]));
        assert!(select_variants(&strings(&["100"]), 3).is_empty());
    }
}
