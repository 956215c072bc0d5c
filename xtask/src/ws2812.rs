use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use drivers::ws2812b::{ColorChannelSequence, ColorToBitPatternConverter, BYTES_PER_LED};

/// Channel order as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sequence {
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl From<Sequence> for ColorChannelSequence {
    fn from(sequence: Sequence) -> Self {
        match sequence {
            Sequence::Rgb => Self::Rgb,
            Sequence::Rbg => Self::Rbg,
            Sequence::Grb => Self::Grb,
            Sequence::Gbr => Self::Gbr,
            Sequence::Brg => Self::Brg,
            Sequence::Bgr => Self::Bgr,
        }
    }
}

/// Parse `FF0000`, `0xFF0000` or `#FF0000` into a packed 24-bit color.
pub fn parse_color(text: &str) -> Result<u32> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('#'))
        .unwrap_or(text);
    let color = u32::from_str_radix(digits, 16)
        .with_context(|| format!("'{text}' is not a hex color"))?;
    if color > 0x00FF_FFFF {
        anyhow::bail!("'{text}' is wider than 24 bits");
    }
    Ok(color)
}

/// Render one LED's SPI bytes as `DB DB DA 92 ...`.
pub fn format_frame(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print the SPI payload the WS2812B driver would send for `colors`.
pub fn run(sequence: Sequence, colors: &[String]) -> Result<()> {
    let colors = colors
        .iter()
        .map(|c| parse_color(c))
        .collect::<Result<Vec<_>>>()?;

    let converter = ColorToBitPatternConverter::new(sequence.into());
    let frame = converter.convert(&colors);

    println!();
    println!(
        "{}",
        format!(
            "💡 {} LED(s), {:?} order, {} bytes",
            colors.len(),
            sequence,
            frame.len()
        )
        .cyan()
        .bold()
    );
    println!();
    for (color, led) in colors.iter().zip(frame.chunks(BYTES_PER_LED)) {
        println!("  {:06X}  {}", color, format_frame(led).green());
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_accepts_common_prefixes() {
        assert_eq!(parse_color("FF0000").unwrap(), 0xFF0000);
        assert_eq!(parse_color("0x00ff00").unwrap(), 0x00FF00);
        assert_eq!(parse_color("#0000FF").unwrap(), 0x0000FF);
    }

    #[test]
    fn parse_color_rejects_garbage_and_wide_values() {
        assert!(parse_color("red").is_err());
        assert!(parse_color("1FFFFFF").is_err());
    }

    #[test]
    fn red_in_rgb_order_formats_as_expected() {
        let converter = ColorToBitPatternConverter::new(Sequence::Rgb.into());
        let frame = converter.convert(&[0xFF0000]);
        assert_eq!(format_frame(&frame), "DB DB DA 92 92 92 92 92");
    }
}
