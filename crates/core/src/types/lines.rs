/// Splits multi-line input into trimmed, non-empty entries.
pub fn parse_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_lines;

    #[test]
    fn parse_lines_trims_and_skips_blank() {
        let lines = parse_lines("  Poster \n\n\tSticker\n   \nCard");
        assert_eq!(lines, vec!["Poster", "Sticker", "Card"]);
    }

    #[test]
    fn parse_lines_keeps_duplicates() {
        let lines = parse_lines("Pin\nPin\n");
        assert_eq!(lines, vec!["Pin", "Pin"]);
    }

    #[test]
    fn parse_lines_empty_input() {
        assert!(parse_lines("").is_empty());
        assert!(parse_lines(" \n \r\n").is_empty());
    }
}
