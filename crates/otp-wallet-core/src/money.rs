//! Wallet amounts.
//!
//! All amounts are integer paise (1 rupee = 100 paise), stored as `i64`.

/// Number of paise in one rupee.
pub const PAISE_PER_RUPEE: i64 = 100;

/// Format an amount in paise as rupees, e.g. `7050` becomes `"₹70.50"`.
#[must_use]
pub fn format_paise(paise: i64) -> String {
    let sign = if paise < 0 { "-" } else { "" };
    let abs = paise.unsigned_abs();
    let per = PAISE_PER_RUPEE.unsigned_abs();
    format!("{sign}₹{}.{:02}", abs / per, abs % per)
}
