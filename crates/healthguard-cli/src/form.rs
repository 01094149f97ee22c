use std::io::{self, BufRead, Write};

use healthguard_core::{DiagnosisRequest, Gender, RequestError, SymptomId, GENDERS, SYMPTOMS};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Lengkapi gejala, usia, dan jenis kelamin")]
    Incomplete,
    #[error("Usia harus berupa bilangan bulat, bukan '{0}'")]
    InvalidAge(String),
    #[error("Diagnosis sedang diproses")]
    Busy,
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Input collected from the user for one submission. Owned by whoever drives
/// the form; nothing here is global.
#[derive(Debug, Default, Clone)]
pub struct FormState {
    selected: Vec<SymptomId>,
    age: String,
    gender: Option<Gender>,
    loading: bool,
}

impl FormState {
    /// Select the symptom, or deselect it if already selected.
    pub fn toggle_symptom(&mut self, id: SymptomId) {
        if let Some(pos) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id);
        }
    }

    pub fn selected(&self) -> &[SymptomId] {
        &self.selected
    }

    pub fn set_age(&mut self, age: impl Into<String>) {
        self.age = age.into();
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = Some(gender);
    }


    /// Submission is allowed once every field is filled and no request is in flight.
    pub fn can_submit(&self) -> bool {
        !self.selected.is_empty()
            && !self.age.trim().is_empty()
            && self.gender.is_some()
            && !self.loading
    }

    /// Build the request and mark the form as loading. Fails while a previous
    /// submission is still in flight.
    pub fn begin_submit(&mut self) -> Result<DiagnosisRequest, FormError> {
        if self.loading {
            return Err(FormError::Busy);
        }
        let request = self.to_request()?;
        self.loading = true;
        Ok(request)
    }

    /// Clear the loading flag once the outcome is known, success or not.
    pub fn finish_submit(&mut self) {
        self.loading = false;
    }

    pub fn to_request(&self) -> Result<DiagnosisRequest, FormError> {
        let gender = match self.gender {
            Some(g) if !self.selected.is_empty() && !self.age.trim().is_empty() => g,
            _ => return Err(FormError::Incomplete),
        };
        let age_text = self.age.trim();
        let age: u32 = age_text
            .parse()
            .map_err(|_| FormError::InvalidAge(age_text.to_string()))?;
        Ok(DiagnosisRequest::new(self.selected.iter().copied(), age, gender)?)
    }
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Resolve one token typed by the user: a 1-based catalog number, an id or a name.
fn resolve_symptom(token: &str) -> Option<SymptomId> {
    if let Ok(n) = token.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| SYMPTOMS.get(i)).map(|s| s.id);
    }
    token.parse().ok()
}

/// Walk the user through the form on a line-oriented terminal.
///
/// Symptoms are toggled by number, id or name; an empty line finishes the list.
/// Returns `None` if input ends before the form is complete.
pub fn prompt_form<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<FormState>> {
    let mut form = FormState::default();

    writeln!(out, "Gejala apa yang Anda alami?")?;
    for (i, sym) in SYMPTOMS.iter().enumerate() {
        writeln!(out, "  {:>2}. {}", i + 1, sym.name)?;
    }

    loop {
        let selected: Vec<&str> = form.selected().iter().map(|s| s.display_name()).collect();
        if selected.is_empty() {
            write!(out, "Pilih gejala (nomor, pisahkan dengan koma): ")?;
        } else {
            write!(
                out,
                "{} gejala dipilih [{}]. Tambah/hapus, atau Enter untuk lanjut: ",
                selected.len(),
                selected.join(", ")
            )?;
        }
        out.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        if line.is_empty() {
            if form.selected().is_empty() {
                writeln!(out, "Pilih minimal satu gejala.")?;
                continue;
            }
            break;
        }
        for token in line.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match resolve_symptom(token) {
                Some(id) => form.toggle_symptom(id),
                None => writeln!(out, "Gejala tidak dikenal: {token}")?,
            }
        }
    }

    loop {
        write!(out, "Usia: ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match line.parse::<u32>() {
            Ok(age) if age <= healthguard_core::MAX_AGE => {
                form.set_age(line);
                break;
            }
            _ => writeln!(out, "Masukkan usia 0 sampai {}.", healthguard_core::MAX_AGE)?,
        }
    }

    loop {
        let options: Vec<String> = GENDERS
            .iter()
            .enumerate()
            .map(|(i, g)| format!("{}. {}", i + 1, g.label()))
            .collect();
        write!(out, "Jenis Kelamin ({}): ", options.join(", "))?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        let picked = match line.parse::<usize>() {
            Ok(n) => n.checked_sub(1).and_then(|i| GENDERS.get(i)).copied(),
            Err(_) => line.parse::<Gender>().ok(),
        };
        match picked {
            Some(g) => {
                form.set_gender(g);
                break;
            }
            None => writeln!(out, "Pilih jenis kelamin.")?,
        }
    }

    Ok(Some(form))
}
