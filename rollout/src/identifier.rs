use crate::errors::IdentifierError;

/// Supplies an identifier for requests that do not carry one.
pub trait IdentifierGenerator: Send + Sync {
    fn generate(&self) -> Result<String, IdentifierError>;
}

/// Random version 4 UUIDs drawn from the operating system's random source.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdentifierGenerator;

impl IdentifierGenerator for RandomIdentifierGenerator {
    fn generate(&self) -> Result<String, IdentifierError> {
        let mut bytes = [0u8; 16];
        getrandom::getrandom(&mut bytes)?;
        Ok(format_uuid_v4(bytes))
    }
}

fn format_uuid_v4(mut bytes: [u8; 16]) -> String {
    // version 4, RFC 4122 variant
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}
