//! Scan request parameters
//!
//! Values are passed through to the scanner verbatim; only absence is checked.

pub const DEFAULT_FORMAT: &str = "png";
pub const DEFAULT_MODE: &str = "gray";
pub const DEFAULT_RESOLUTION: &str = "300";

/// Parameters for a single scan invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanParams {
    /// Image encoding (`--format`)
    pub format: String,
    /// Color mode (`--mode`)
    pub mode: String,
    /// DPI as text (`--resolution`)
    pub resolution: String,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            mode: DEFAULT_MODE.to_string(),
            resolution: DEFAULT_RESOLUTION.to_string(),
        }
    }
}

impl ScanParams {
    /// Build parameters from decoded form pairs.
    ///
    /// The first value for each key wins; empty values keep the default.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut format = None;
        let mut mode = None;
        let mut resolution = None;

        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "format" => &mut format,
                "mode" => &mut mode,
                "resolution" => &mut resolution,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        let mut params = Self::default();
        override_if_set(&mut params.format, format);
        override_if_set(&mut params.mode, mode);
        override_if_set(&mut params.resolution, resolution);
        params
    }

    /// Command-line flags for the scanner, device first
    pub fn to_args(&self, device: &str) -> [String; 4] {
        [
            format!("--device-name={device}"),
            format!("--format={}", self.format),
            format!("--mode={}", self.mode),
            format!("--resolution={}", self.resolution),
        ]
    }
}

fn override_if_set(target: &mut String, value: Option<impl AsRef<str>>) {
    if let Some(v) = value {
        let v = v.as_ref();
        if !v.is_empty() {
            *target = v.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let params = ScanParams::from_pairs(Vec::<(String, String)>::new());
        assert_eq!(params.format, "png");
        assert_eq!(params.mode, "gray");
        assert_eq!(params.resolution, "300");
    }

    #[test]
    fn test_each_field_overrides_independently() {
        let params = ScanParams::from_pairs([("mode", "color")]);
        assert_eq!(params.format, "png");
        assert_eq!(params.mode, "color");
        assert_eq!(params.resolution, "300");

        let params = ScanParams::from_pairs([("format", "jpeg"), ("resolution", "600")]);
        assert_eq!(params.format, "jpeg");
        assert_eq!(params.mode, "gray");
        assert_eq!(params.resolution, "600");
    }

    #[test]
    fn test_empty_value_keeps_default() {
        let params = ScanParams::from_pairs([("format", ""), ("mode", "lineart")]);
        assert_eq!(params.format, "png");
        assert_eq!(params.mode, "lineart");
    }

    #[test]
    fn test_first_value_wins() {
        // An empty first value still shadows later ones
        let params = ScanParams::from_pairs([
            ("resolution", "150"),
            ("resolution", "1200"),
            ("format", ""),
            ("format", "tiff"),
        ]);
        assert_eq!(params.resolution, "150");
        assert_eq!(params.format, "png");
    }

    #[test]
    fn test_unknown_keys_ignored_and_values_verbatim() {
        let params = ScanParams::from_pairs([("source", "ADF"), ("resolution", "abc")]);
        assert_eq!(params.resolution, "abc");
        assert_eq!(params, ScanParams { resolution: "abc".into(), ..ScanParams::default() });
    }

    #[test]
    fn test_to_args() {
        let args = ScanParams::default().to_args("epson2:libusb:001:004");
        assert_eq!(
            args,
            [
                "--device-name=epson2:libusb:001:004".to_string(),
                "--format=png".to_string(),
                "--mode=gray".to_string(),
                "--resolution=300".to_string(),
            ]
        );
    }
}
