//! Scale reference page
//!
//! Each scale is a list of semitone offsets from the root. Offsets of 12 or
//! more reach into higher octaves (the overtone series spans four).

use axum::response::Html;

use super::layout::{escape_html, render_page};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Octave of the root note in scientific pitch notation
const ROOT_OCTAVE: u8 = 4;

pub struct Scale {
    pub name: &'static str,
    pub intervals: &'static [u8],
}

pub const SCALES: &[Scale] = &[
    Scale { name: "Major", intervals: &[0, 2, 4, 5, 7, 9, 11] },
    Scale { name: "Minor", intervals: &[0, 2, 3, 5, 7, 8, 10] },
    Scale { name: "Pentatonic Major", intervals: &[0, 2, 4, 7, 9] },
    Scale { name: "Pentatonic Minor", intervals: &[0, 3, 5, 7, 10] },
    // Messiaen's modes of limited transposition
    Scale { name: "MOLT 1 (Whole tone)", intervals: &[0, 2, 4, 6, 8, 10] },
    Scale { name: "MOLT 2 (Octatonic)", intervals: &[0, 1, 3, 4, 6, 7, 9, 10] },
    Scale { name: "MOLT 3", intervals: &[0, 2, 3, 4, 6, 7, 8, 10, 11] },
    Scale { name: "MOLT 4", intervals: &[0, 1, 2, 5, 6, 7, 8, 11] },
    Scale { name: "MOLT 5", intervals: &[0, 1, 5, 6, 7, 11] },
    Scale { name: "MOLT 6", intervals: &[0, 2, 4, 5, 6, 8, 10, 11] },
    Scale { name: "MOLT 7", intervals: &[0, 1, 2, 3, 5, 6, 7, 8, 9, 11] },
    Scale {
        name: "Overtone (Theoretical)",
        intervals: &[0, 12, 19, 24, 28, 31, 34, 36, 38, 40, 42, 43, 45, 46, 47, 48],
    },
    Scale {
        name: "Overtone (Audible)",
        intervals: &[0, 12, 19, 24, 28, 31, 36, 38, 40, 43, 47, 48],
    },
];

/// Note name with octave for a semitone offset above C4
pub fn note_name(semitones: u8) -> String {
    let name = NOTE_NAMES[usize::from(semitones % 12)];
    format!("{}{}", name, ROOT_OCTAVE + semitones / 12)
}

pub fn scale_notes(scale: &Scale) -> Vec<String> {
    scale.intervals.iter().copied().map(note_name).collect()
}

/// GET /scales
pub async fn scales_page() -> Html<String> {
    let rows: String = SCALES
        .iter()
        .map(|scale| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(scale.name),
                scale_notes(scale).join(" "),
                scale
                    .intervals
                    .iter()
                    .map(u8::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        })
        .collect();

    let content = format!(
        r#"<h1>Scales</h1>
<p>Scales rooted on C4 with their semitone offsets.</p>
<table class="scales">
<thead><tr><th>Scale</th><th>Notes</th><th>Semitones</th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
    );

    Html(render_page("Scales", &[], "", &content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_names_cross_octaves() {
        assert_eq!(note_name(0), "C4");
        assert_eq!(note_name(11), "B4");
        assert_eq!(note_name(19), "G5");
        assert_eq!(note_name(48), "C8");
    }

    #[test]
    fn test_major_scale_notes() {
        let major = SCALES.iter().find(|s| s.name == "Major").unwrap();
        assert_eq!(
            scale_notes(major),
            vec!["C4", "D4", "E4", "F4", "G4", "A4", "B4"]
        );
    }
}
