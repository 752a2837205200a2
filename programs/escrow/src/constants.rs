/// Domain tag for escrow record addresses
pub const ESCROW_SEED: &[u8] = b"escrow";
