use std::env;
use std::path::PathBuf;

fn fallback_dotenv_path(
    intake_home: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    match (intake_home, home_dir) {
        (Some(intake_home), _) => Some(intake_home.join(".env")),
        (None, Some(home)) => Some(home.join(".intake").join(".env")),
        (None, None) => None,
    }
}

/// Load `./.env`, or `$INTAKE_HOME/.env` (default `~/.intake/.env`) when the
/// working directory has none. Existing variables are never overwritten.
pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    let intake_home = env::var_os("INTAKE_HOME")
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from);
    if let Some(path) = fallback_dotenv_path(intake_home, dirs::home_dir())
        .filter(|path| path.is_file())
    {
        // A malformed fallback file leaves the environment as it was.
        dotenvy::from_path(&path).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::fallback_dotenv_path;
    use std::path::PathBuf;

    #[test]
    fn fallback_prefers_intake_home() {
        let got = fallback_dotenv_path(
            Some(PathBuf::from("/srv/intake")),
            Some(PathBuf::from("/home/alice")),
        );

        let want = Some(PathBuf::from("/srv/intake/.env"));
        assert_eq!(got, want);
    }

    #[test]
    fn fallback_uses_dot_intake_under_home_when_unset() {
        let got = fallback_dotenv_path(None, Some(PathBuf::from("/home/alice")));
        let want = Some(PathBuf::from("/home/alice/.intake/.env"));
        assert_eq!(got, want);
    }

    #[test]
    fn fallback_absent_without_any_home() {
        assert_eq!(fallback_dotenv_path(None, None), None);
    }
}
