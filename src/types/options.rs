use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Host-supplied conversion from a stored date string to an instant.
/// Required only for `between` over textual date fields; its absence there is
/// a declared capability gap, not a silent default.
pub type DateHook = Arc<dyn Fn(&str) -> Option<DateTime<Utc>> + Send + Sync>;

/// Per-call compilation options.
///
/// Passed explicitly to every compile call; there is no process-wide state.
/// The UTC date policy is an ordinary field defaulting to `true`, overridable
/// per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Address the whole dotted field string through a single uniform
    /// accessor member instead of walking structural members.
    pub use_indexed_access: bool,
    /// The member holding dynamically-keyed fields when
    /// [`use_indexed_access`](Self::use_indexed_access) is set.
    pub indexed_accessor_name: Option<String>,
    /// Interpret naive date tokens as UTC instants (default). When `false`,
    /// naive tokens are interpreted in the host's local zone and converted.
    pub parse_dates_as_utc: bool,
    /// Locale used for date-component order and the decimal separator.
    pub locale: Locale,
    /// Resolver consulted for unmatched path segments when no
    /// member-attached resolver is in scope.
    pub fallback_resolver: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            use_indexed_access: false,
            indexed_accessor_name: None,
            parse_dates_as_utc: true,
            locale: Locale::EnUs,
            fallback_resolver: None,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route every field lookup through the uniform accessor member `name`.
    #[must_use]
    pub fn indexed_access(mut self, name: &str) -> Self {
        self.use_indexed_access = true;
        self.indexed_accessor_name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn parse_dates_as_utc(mut self, utc: bool) -> Self {
        self.parse_dates_as_utc = utc;
        self
    }

    #[must_use]
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    #[must_use]
    pub fn fallback_resolver(mut self, name: &str) -> Self {
        self.fallback_resolver = Some(name.to_owned());
        self
    }
}

/// Conversion locale for leaf-rule values: decides date-component order and
/// the decimal separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// `en-US`: month/day/year, `.` decimal separator.
    #[default]
    EnUs,
    /// `en-GB`: day/month/year, `.` decimal separator.
    EnGb,
    /// `de-DE`: day.month.year, `,` decimal separator.
    DeDe,
    /// `fr-FR`: day/month/year, `,` decimal separator.
    FrFr,
}

/// ISO forms accepted for any locale, tried before locale-specific formats.
const ISO_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

impl Locale {
    /// Parse a BCP 47-ish tag, case-insensitively, accepting `-` or `_`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.replace('_', "-").to_ascii_lowercase().as_str() {
            "en-us" | "en" => Some(Locale::EnUs),
            "en-gb" => Some(Locale::EnGb),
            "de-de" | "de" => Some(Locale::DeDe),
            "fr-fr" | "fr" => Some(Locale::FrFr),
            _ => None,
        }
    }

    fn decimal_separator(self) -> char {
        match self {
            Locale::EnUs | Locale::EnGb => '.',
            Locale::DeDe | Locale::FrFr => ',',
        }
    }

    fn datetime_formats(self) -> &'static [&'static str] {
        match self {
            Locale::EnUs => &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"],
            Locale::EnGb | Locale::FrFr => &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"],
            Locale::DeDe => &["%d.%m.%Y %H:%M:%S", "%d.%m.%Y %H:%M"],
        }
    }

    fn date_formats(self) -> &'static [&'static str] {
        match self {
            Locale::EnUs => &["%m/%d/%Y"],
            Locale::EnGb | Locale::FrFr => &["%d/%m/%Y"],
            Locale::DeDe => &["%d.%m.%Y"],
        }
    }

    pub(crate) fn parse_i64(self, token: &str) -> Option<i64> {
        token.trim().parse().ok()
    }

    pub(crate) fn parse_f64(self, token: &str) -> Option<f64> {
        let sep = self.decimal_separator();
        let token = token.trim();
        if sep == '.' {
            token.parse().ok()
        } else {
            token.replace(sep, ".").parse().ok()
        }
    }

    pub(crate) fn parse_bool(self, token: &str) -> Option<bool> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("true") {
            Some(true)
        } else if token.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    /// Parse a date token. RFC 3339 stamps keep their offset; naive stamps
    /// are interpreted as UTC when `as_utc` is set, otherwise in the host's
    /// local zone, and the result is normalized to UTC either way.
    ///
    /// Public so hosts can reuse the locale's format tables when supplying a
    /// [`DateHook`].
    #[must_use]
    pub fn parse_datetime(self, token: &str, as_utc: bool) -> Option<DateTime<Utc>> {
        let token = token.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
            return Some(dt.with_timezone(&Utc));
        }

        let naive = self.parse_naive(token)?;
        if as_utc {
            Some(Utc.from_utc_datetime(&naive))
        } else {
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }

    fn parse_naive(self, token: &str) -> Option<NaiveDateTime> {
        for fmt in ISO_DATETIME_FORMATS.iter().chain(self.datetime_formats()) {
            if let Ok(dt) = NaiveDateTime::parse_from_str(token, fmt) {
                return Some(dt);
            }
        }
        for fmt in std::iter::once(&ISO_DATE_FORMAT).chain(self.date_formats()) {
            if let Ok(d) = NaiveDate::parse_from_str(token, fmt) {
                return d.and_hms_opt(0, 0, 0);
            }
        }
        None
    }
}
