/// Set the locale for user-facing console messages
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}
