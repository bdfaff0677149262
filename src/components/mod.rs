// Export components
pub mod gmail;
pub mod google_calendar;

// Re-export component handles
pub use gmail::GmailHandle;
pub use google_calendar::GoogleCalendarHandle;
