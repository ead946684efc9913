/// Platform detection and platform-specific operations
pub struct PlatformDetector;

impl PlatformDetector {
    /// Returns true when the Chrome AppleScript adapter can work here
    /// Currently only macOS is supported
    pub fn supports_chrome_scripting() -> bool {
        cfg!(target_os = "macos")
    }

    /// The system command that hands a URI to its registered handler
    pub fn opener_command() -> (&'static str, &'static [&'static str]) {
        if cfg!(target_os = "macos") {
            ("open", &[])
        } else if cfg!(target_os = "windows") {
            // `cmd /C start` would split the URI at every `&`
            ("rundll32", &["url.dll,FileProtocolHandler"])
        } else {
            ("xdg-open", &[])
        }
    }

    /// Opens a URI (custom schemes included) with the platform's default handler
    pub fn open_uri(uri: &str) -> Result<(), String> {
        let (program, args) = Self::opener_command();
        std::process::Command::new(program)
            .args(args)
            .arg(uri)
            .spawn()
            .map_err(|e| format!("Failed to open {}: {}", uri.split(':').next().unwrap_or("URI"), e))?;
        Ok(())
    }
}
