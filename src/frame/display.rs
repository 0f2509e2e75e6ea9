//! Text rendering for frame previews and summaries

use std::fmt;

use super::{Cell, Frame};

/// Render rows as a left-aligned grid under a header row
fn render_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, value) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut output = String::new();
    output.push_str(&line(headers));
    output.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&line(rule.as_slice()));
    output.push('\n');
    for row in rows {
        output.push_str(&line(row.as_slice()));
        output.push('\n');
    }
    output
}

fn stat(value: Option<f64>) -> String {
    value
        .map(|v| Cell::Number(v).to_string())
        .unwrap_or_default()
}

impl Frame {
    /// Header line plus a grid of the preview rows
    pub fn show(&self) -> String {
        let mut output = format!(
            "{}: {} rows x {} columns\n",
            self.key,
            self.rows,
            self.ncols()
        );

        if self.columns.is_empty() {
            return output;
        }

        let headers: Vec<String> = self.columns.iter().map(|c| c.label.clone()).collect();
        let rows: Vec<Vec<String>> = self
            .head(self.preview_len())
            .into_iter()
            .map(|row| row.iter().map(Cell::to_string).collect())
            .collect();

        output.push_str(&render_grid(&headers, &rows));

        let shown = rows.len() as u64;
        if shown < self.rows {
            output.push_str(&format!("[{} of {} rows shown]\n", shown, self.rows));
        }
        output
    }

    /// Per-column type, missing count and numeric statistics
    pub fn describe(&self) -> String {
        let headers: Vec<String> = ["column", "type", "missing", "min", "max", "mean", "sigma"]
            .iter()
            .map(|h| h.to_string())
            .collect();

        let rows: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| {
                vec![
                    c.label.clone(),
                    c.column_type.name().to_string(),
                    c.missing_count.to_string(),
                    stat(c.min),
                    stat(c.max),
                    stat(c.mean),
                    stat(c.sigma),
                ]
            })
            .collect();

        format!(
            "{}: {} rows x {} columns\n{}",
            self.key,
            self.rows,
            self.ncols(),
            render_grid(&headers, &rows)
        )
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.show())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::tests::prostate;

    #[test]
    fn test_show_header_and_grid() {
        let output = prostate().show();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "prostate.hex: 380 rows x 3 columns");
        assert_eq!(lines[1], "ID  RACE   PSA");
        assert_eq!(lines[2], "--  -----  ---");
        assert_eq!(lines[3], "1   white  1.4");
        assert_eq!(lines[5], "3   NA     0.3");
        assert_eq!(lines[6], "[3 of 380 rows shown]");
    }

    #[test]
    fn test_display_matches_show() {
        let frame = prostate();
        assert_eq!(frame.to_string(), frame.show());
    }

    #[test]
    fn test_describe() {
        let output = prostate().describe();
        assert!(output.starts_with("prostate.hex: 380 rows x 3 columns\n"));
        let race = output.lines().find(|l| l.starts_with("RACE")).unwrap();
        assert!(race.contains("enum"));
        let psa = output.lines().find(|l| l.starts_with("PSA")).unwrap();
        assert!(psa.contains("139.7"));
    }

    #[test]
    fn test_grid_pads_to_widest() {
        let grid = render_grid(
            &["a".to_string(), "b".to_string()],
            &[vec!["long".to_string(), "x".to_string()]],
        );
        assert_eq!(grid, "a     b\n----  -\nlong  x\n");
    }
}
