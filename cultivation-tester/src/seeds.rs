use anyhow::{Result, bail};

/// Seed used when the command line names none.
pub const DEFAULT_SEED: u64 = 1337;

/// Parse a single seed token: decimal (negative values fold to their
/// magnitude) or `0x`-prefixed hex.
pub fn parse_seed(token: &str) -> Result<u64> {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        let cleaned = hex.replace('_', "");
        return match u64::from_str_radix(&cleaned, 16) {
            Ok(value) => Ok(value),
            Err(_) => bail!("Unrecognized seed token: {token}"),
        };
    }

    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }

    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }

    bail!("Unrecognized seed token: {token}")
}

/// Resolve CLI seed tokens into a de-duplicated list, preserving order.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();
    for token in tokens {
        if token.trim().is_empty() {
            continue;
        }
        let seed = parse_seed(token)?;
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_hex_and_negative() {
        assert_eq!(parse_seed("42").unwrap(), 42);
        assert_eq!(parse_seed("-7").unwrap(), 7);
        assert_eq!(parse_seed("0x2A").unwrap(), 42);
        assert_eq!(parse_seed("0xdead_beef").unwrap(), 0xDEAD_BEEF);
        assert_eq!(parse_seed("18446744073709551615").unwrap(), u64::MAX);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_seed("CL-ORANGE42").is_err());
        assert!(parse_seed("0xZZ").is_err());
    }

    #[test]
    fn resolves_with_dedup_and_default() {
        let raw = split_csv("42, 0x2a,, 9");
        assert_eq!(resolve_seed_inputs(&raw).unwrap(), vec![42, 9]);
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![DEFAULT_SEED]);
    }
}
