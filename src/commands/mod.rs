pub mod augment;
pub mod generate;
pub mod sprites;

pub(crate) fn parse_size(s: &str) -> anyhow::Result<(u32, u32)> {
    let (w_s, h_s) = s
        .split_once('x')
        .ok_or_else(|| anyhow::anyhow!("invalid --cell (expected WxH): {s}"))?;
    let w: u32 = w_s
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid --cell width: {w_s}"))?;
    let h: u32 = h_s
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid --cell height: {h_s}"))?;
    if w == 0 || h == 0 {
        anyhow::bail!("--cell must be > 0x0");
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_ok() {
        assert_eq!(parse_size("32x32").unwrap(), (32, 32));
        assert_eq!(parse_size("16x48").unwrap(), (16, 48));
    }

    #[test]
    fn parse_size_err() {
        assert!(parse_size("32").is_err());
        assert!(parse_size("axb").is_err());
        assert!(parse_size("32x").is_err());
        assert!(parse_size("0x32").is_err());
    }
}
