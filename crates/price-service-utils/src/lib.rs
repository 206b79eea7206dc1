pub mod formatting;
pub mod logging;

#[cfg(feature = "testing")]
pub mod testing;
