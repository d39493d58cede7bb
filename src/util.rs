use indicatif::{ProgressBar, ProgressStyle};

const HEX_DUMP_WIDTH: usize = 16;

pub(crate) fn create_progress_bar(total_steps: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_steps);

    let style = ProgressStyle::default_bar()
        .template(
            "[{spinner:.green} {elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(msg.to_owned());

    pb
}

/// Render bytes as `address: hex  ascii` rows, addresses starting at `start`
pub fn hex_dump(bytes: &[u8], start: u16) -> String {
    let mut out = String::new();

    for (row, chunk) in bytes.chunks(HEX_DUMP_WIDTH).enumerate() {
        let address = start as usize + row * HEX_DUMP_WIDTH;
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();

        out.push_str(&format!(
            "{:06x}: {:<width$}  {}\n",
            address,
            hex.join(" "),
            ascii,
            width = HEX_DUMP_WIDTH * 3 - 1
        ));
    }

    out
}
