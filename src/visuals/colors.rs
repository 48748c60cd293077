use std::collections::BTreeSet;

pub type Rgba = [u8; 4];

const MISSING_RGB: [u8; 3] = [150, 150, 150];

const VIRIDIS: [&str; 10] = [
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b", "#fde725",
];

const PLASMA: [&str; 10] = [
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a",
    "#fdca26", "#f0f921",
];

/// Plotly sequential palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    Viridis,
    Plasma,
}

impl Palette {
    pub fn colors(&self) -> &'static [&'static str] {
        match self {
            Palette::Viridis => &VIRIDIS,
            Palette::Plasma => &PLASMA,
        }
    }
}

/// `#rrggbb` (leading `#` optional) to RGBA. Malformed channels read as 0.
pub fn hex_to_rgba(hex: &str, alpha: u8) -> Rgba {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .unwrap_or(0)
    };
    [channel(0), channel(2), channel(4), alpha]
}

/// Maps ordinal values (e.g. years) onto a palette.
///
/// Distinct values are ranked ascending and the i-th rank takes palette entry
/// `i % palette.len()`, so long ranges wrap around. Missing values are grey.
pub fn map_ordinal_to_color<T: Ord>(values: &[Option<T>], palette: Palette, alpha: u8) -> Vec<Rgba> {
    let ranked: Vec<&T> = values
        .iter()
        .flatten()
        .collect::<BTreeSet<&T>>()
        .into_iter()
        .collect();
    let colors = palette.colors();

    values
        .iter()
        .map(|value| match value {
            Some(v) => {
                // ranked is sorted and contains every present value
                let rank = ranked.binary_search(&v).unwrap_or(0);
                hex_to_rgba(colors[rank % colors.len()], alpha)
            }
            None => [MISSING_RGB[0], MISSING_RGB[1], MISSING_RGB[2], alpha],
        })
        .collect()
}
