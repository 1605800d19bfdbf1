use dotenvy::var;

pub const DEFAULT_AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/?name=";

#[derive(Clone, Debug)]
pub struct RosterConfig {
    pub sheet_csv_url: Option<String>,
    pub headers: SheetHeaders,
    pub avatar_base_url: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            sheet_csv_url: None,
            headers: SheetHeaders::default(),
            avatar_base_url: DEFAULT_AVATAR_BASE_URL.to_string(),
        }
    }
}

impl RosterConfig {
    /// Every setting has a default, so a missing variable is configuration
    /// rather than an error. An empty `GINGHAM_SHEET_CSV_URL` counts as unset.
    #[must_use]
    pub fn from_env() -> Self {
        let opt_var = |name: &str| var(name).ok().filter(|value| !value.is_empty());

        let defaults = SheetHeaders::default();

        Self {
            sheet_csv_url: opt_var("GINGHAM_SHEET_CSV_URL"),
            headers: SheetHeaders {
                full_name: defaults
                    .full_name
                    .with_canonical(opt_var("GINGHAM_HEADER_FULL_NAME")),
                phone: defaults.phone.with_canonical(opt_var("GINGHAM_HEADER_PHONE")),
                image: defaults.image.with_canonical(opt_var("GINGHAM_HEADER_IMAGE")),
                class: defaults.class.with_canonical(opt_var("GINGHAM_HEADER_CLASS")),
                notes: defaults.notes.with_canonical(opt_var("GINGHAM_HEADER_NOTES")),
            },
            avatar_base_url: opt_var("GINGHAM_AVATAR_BASE_URL")
                .unwrap_or_else(|| DEFAULT_AVATAR_BASE_URL.to_string()),
        }
    }
}

/// Canonical column names for the five semantic fields, each with the
/// Hebrew header accepted when the canonical one is absent.
#[derive(Clone, Debug)]
pub struct SheetHeaders {
    pub full_name: FieldHeaders,
    pub phone: FieldHeaders,
    pub image: FieldHeaders,
    pub class: FieldHeaders,
    pub notes: FieldHeaders,
}

impl Default for SheetHeaders {
    fn default() -> Self {
        Self {
            full_name: FieldHeaders::new("Full Name", Some("שם מלא")),
            phone: FieldHeaders::new("Phone", Some("טלפון")),
            image: FieldHeaders::new("Image", Some("תמונה")),
            class: FieldHeaders::new("Class", Some("כיתה")),
            notes: FieldHeaders::new("Notes", Some("הערות")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FieldHeaders {
    pub canonical: String,
    pub fallback: Option<String>,
}

impl FieldHeaders {
    #[must_use]
    pub fn new(canonical: &str, fallback: Option<&str>) -> Self {
        Self {
            canonical: canonical.to_string(),
            fallback: fallback.map(ToString::to_string),
        }
    }

    #[must_use]
    fn with_canonical(mut self, canonical: Option<String>) -> Self {
        if let Some(canonical) = canonical {
            self.canonical = canonical;
        }
        self
    }
}
