//! Contact message text (pt-BR).

use surgery_tracker_core::PatientRecord;

/// Message sent when following up on a surgical risk request.
pub fn contact_message(name: &str, doctor: &str, surgery: &str, days: u32) -> String {
    format!(
        "Olá, {name}. Estamos entrando em contato sobre o risco cirúrgico solicitado pelo \
         {doctor} para a cirurgia de {surgery}. Já se passaram {days} dias desde a \
         solicitação do médico. Ficamos à disposição para ajudar!"
    )
}

/// [`contact_message`] filled from a record.
pub fn message_for(patient: &PatientRecord, days: u32) -> String {
    contact_message(&patient.name, &patient.doctor, &patient.surgery_type, days)
}
