mod dispatch;
mod json_good;
mod property_roundtrip;
#[cfg(feature = "xml")]
mod xml_roundtrip;
