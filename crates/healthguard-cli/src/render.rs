use std::io::{self, Write};

use healthguard_core::{DiagnosisResult, Urgency};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const RESET: &str = "\x1b[0m";

pub fn display_welcome<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "╔═══════════════════════════════════════════════════════════════╗")?;
    writeln!(out, "║                        HealthGuard AI                         ║")?;
    writeln!(out, "║                   Asisten Diagnosa Pintar                     ║")?;
    writeln!(out, "╠═══════════════════════════════════════════════════════════════╣")?;
    writeln!(out, "║  Jelaskan gejala Anda dan dapatkan wawasan kesehatan berbasis ║")?;
    writeln!(out, "║  AI. Alat ini hanya untuk tujuan informasi dan tidak          ║")?;
    writeln!(out, "║  menggantikan saran medis profesional.                        ║")?;
    writeln!(out, "╚═══════════════════════════════════════════════════════════════╝")?;
    writeln!(out)
}

pub fn display_error<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "\n┌─ Error ───────────────────────────────────────────────────────")?;
    writeln!(out, "│ Terjadi kesalahan: {message}")?;
    writeln!(out, "└───────────────────────────────────────────────────────────────")
}

fn urgency_color(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Emergency => "\x1b[1;31m",
        Urgency::Soon => "\x1b[1;33m",
        Urgency::Normal => "\x1b[1;32m",
    }
}

fn list<W: Write>(out: &mut W, heading: &str, items: Option<&Vec<String>>) -> io::Result<()> {
    let Some(items) = items.filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    writeln!(out, "\n{heading}")?;
    for item in items {
        writeln!(out, "  • {item}")?;
    }
    Ok(())
}

/// Render a diagnosis as text panels. Any field may be missing; missing lists
/// are skipped and missing scalars print as "-".
pub fn display_diagnosis<W: Write>(
    out: &mut W,
    d: &DiagnosisResult,
    color: bool,
) -> io::Result<()> {
    let level = d.urgency_level.as_deref().unwrap_or("-");
    let badge = if color {
        format!("{}[{level}]{RESET}", urgency_color(d.urgency()))
    } else {
        format!("[{level}]")
    };

    writeln!(out, "\n{RULE}")?;
    writeln!(out, "  Hasil Penilaian    {badge}")?;
    writeln!(out, "{RULE}")?;

    if let Some(conditions) = d.possible_conditions.as_ref().filter(|c| !c.is_empty()) {
        writeln!(out, "\nKemungkinan Kondisi")?;
        for c in conditions {
            writeln!(out, "┌─────────────────────────────────────────────────────────────")?;
            writeln!(
                out,
                "│ {}  ({})",
                c.name.as_deref().unwrap_or("-"),
                c.probability.as_deref().unwrap_or("-")
            )?;
            if let Some(desc) = c.description.as_deref().filter(|s| !s.is_empty()) {
                writeln!(out, "│ {desc}")?;
            }
            writeln!(out, "└─────────────────────────────────────────────────────────────")?;
        }
    }

    let recs = d.recommendations.as_ref();
    list(out, "Tindakan Segera", recs.and_then(|r| r.immediate.as_ref()))?;
    list(out, "Obat yang Disarankan", recs.and_then(|r| r.medications.as_ref()))?;
    list(out, "Rekomendasi Gaya Hidup", recs.and_then(|r| r.lifestyle.as_ref()))?;
    list(out, "Langkah Pencegahan", d.preventive_measures.as_ref())?;

    writeln!(out, "\nSaran Medis Profesional")?;
    writeln!(out, "  {}", d.seek_medical_attention.as_deref().unwrap_or("-"))?;

    writeln!(out, "\n{RULE}")?;
    writeln!(
        out,
        "  Pemberitahuan Penting: Penilaian ini hanya untuk tujuan informasi\n  \
dan tidak menggantikan saran medis profesional, diagnosis, atau\n  \
pengobatan. Selalu konsultasikan dengan dokter atau penyedia layanan\n  \
kesehatan yang berkualifikasi."
    )?;
    writeln!(out, "{RULE}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthguard_core::{PossibleCondition, Recommendations};

    fn render(d: &DiagnosisResult, color: bool) -> String {
        let mut buf = Vec::new();
        display_diagnosis(&mut buf, d, color).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn renders_every_section() {
        let d = DiagnosisResult {
            possible_conditions: Some(vec![PossibleCondition {
                name: Some("Influenza".into()),
                probability: Some("Tinggi".into()),
                description: Some("Infeksi virus".into()),
            }]),
            recommendations: Some(Recommendations {
                immediate: Some(vec!["Istirahat".into()]),
                lifestyle: Some(vec!["Tidur cukup".into()]),
                medications: Some(vec!["Parasetamol".into()]),
            }),
            urgency_level: Some("Segera".into()),
            seek_medical_attention: Some("Dalam 24 jam".into()),
            preventive_measures: Some(vec!["Cuci tangan".into()]),
        };
        let text = render(&d, false);
        for needle in [
            "[Segera]",
            "Kemungkinan Kondisi",
            "Influenza  (Tinggi)",
            "Infeksi virus",
            "Tindakan Segera",
            "  • Parasetamol",
            "Rekomendasi Gaya Hidup",
            "Langkah Pencegahan",
            "Dalam 24 jam",
            "Pemberitahuan Penting",
        ] {
            assert!(text.contains(needle), "missing {needle:?}");
        }
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn empty_result_renders_placeholders() {
        let text = render(&DiagnosisResult::default(), false);
        assert!(text.contains("[-]"));
        assert!(!text.contains("Kemungkinan Kondisi"));
        assert!(!text.contains("Tindakan Segera"));
        assert!(text.contains("Saran Medis Profesional\n  -\n"));
    }

    #[test]
    fn badge_color_follows_urgency() {
        let d = DiagnosisResult {
            urgency_level: Some("Darurat".into()),
            ..Default::default()
        };
        assert!(render(&d, true).contains("\x1b[1;31m[Darurat]\x1b[0m"));
    }

    #[test]
    fn error_banner() {
        let mut buf = Vec::new();
        display_error(&mut buf, "Gagal mengurai diagnosis: Format JSON tidak valid").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Terjadi kesalahan: Gagal mengurai diagnosis"));
    }
}
