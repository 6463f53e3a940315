use anyhow::bail;
use app_unique_words::UniqueWords;
use common::App;

pub const DEFAULT_APP: &str = app_unique_words::NAME;

/// Names accepted by [`load`].
pub const KNOWN_APPS: &[&str] = &[app_unique_words::NAME, "uw"];

pub fn load(app_name: &str) -> anyhow::Result<App> {
    match app_name.trim() {
        app_unique_words::NAME | "uw" => Ok(App::new(UniqueWords)),
        other => bail!(
            "unknown app `{}`, expected one of: {}",
            other,
            KNOWN_APPS.join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_known() {
        assert_eq!(load("unique_words").unwrap().app_name, "unique_words");
        assert_eq!(load(" uw ").unwrap().app_name, "unique_words");
    }

    #[test]
    fn test_load_unknown() {
        let err = load("wc").unwrap_err().to_string();
        assert!(err.contains("`wc`"));
        assert!(err.contains("unique_words"));
    }
}
