/// Number of hex digits in an Organizationally Unique Identifier.
pub const OUI_LEN: usize = 6;

const SEPARATORS: [char; 3] = [':', '-', '.'];

/// Reduces a MAC address, or any prefix of one, to its OUI key.
///
/// Separators are stripped and the result is uppercased and cut to
/// [`OUI_LEN`] characters. Inputs that are too short come back shorter than
/// that, which callers treat as "no vendor".
///
/// `"dc:4b:a1"`, `"DC-4B-A1"` and `"dc4b.a1"` all become `"DC4BA1"`.
pub fn normalize_oui(mac: &str) -> String {
    mac.chars()
        .filter(|c| !SEPARATORS.contains(c))
        .take(OUI_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
