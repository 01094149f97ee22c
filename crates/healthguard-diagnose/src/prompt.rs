use healthguard_core::DiagnosisRequest;

/// Example of the reply shape. Sent verbatim so the model can copy the keys.
const RESPONSE_SCHEMA: &str = r#"{
  "diagnosis": {
    "possibleConditions": [
      {
        "name": "Nama Penyakit",
        "probability": "Tinggi/Sedang/Rendah",
        "description": "Deskripsi singkat tentang penyakit"
      }
    ],
    "recommendations": {
      "immediate": ["Tindakan yang harus segera dilakukan"],
      "lifestyle": ["Saran perubahan gaya hidup"],
      "medications": ["Obat yang disarankan (dosis umum)"]
    },
    "urgencyLevel": "Normal/Segera/Darurat",
    "seekMedicalAttention": "Saran kapan harus ke dokter",
    "preventiveMeasures": ["Langkah pencegahan yang disarankan"]
  }
}"#;

/// Build the instruction sent to the model for one submission.
pub fn build_prompt(request: &DiagnosisRequest) -> String {
    let symptoms = request.symptom_names().join(", ");

    format!(
        "PENTING: Jawab PERSIS dalam format JSON yang valid.\n\
DILARANG menambahkan komentar atau teks di luar struktur JSON.\n\n\
Berikan diagnosis dan saran kesehatan berdasarkan gejala berikut:\n\
- Gejala: {symptoms}\n\
- Usia: {age}\n\
- Jenis Kelamin: {gender}\n\n\
Format jawaban HARUS dalam JSON yang valid dengan struktur berikut:\n\
{schema}\n\n\
Pastikan:\n\
- Diagnosis sesuai dengan kombinasi gejala\n\
- Pertimbangkan faktor usia dan jenis kelamin\n\
- Berikan saran yang spesifik dan praktis\n\
- Sertakan peringatan jika gejala mengindikasikan kondisi serius",
        age = request.age(),
        gender = request.gender().label(),
        schema = RESPONSE_SCHEMA,
    )
}
