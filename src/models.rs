use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// One CSV data row as published, keyed by the header text.
///
/// Headers keep their source order. When a header repeats, lookups resolve to
/// its first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.fields.push((header.into(), value.into()));
    }

    /// Returns the trimmed value under `header`, treating blank cells as missing.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == header)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// First non-blank value among `headers`, tried in order.
    pub fn get_any(&self, headers: &[&str]) -> Option<&str> {
        headers.iter().find_map(|header| self.get(header))
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (header, value) in iter {
            row.push(header, value);
        }
        row
    }
}

/// Compliance check outcome for one pillar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PillarStatus {
    Ok,
    Pending,
    #[default]
    NotFound,
    /// A value outside the published tri-state, kept verbatim.
    Other(String),
}

impl PillarStatus {
    pub const OK: &'static str = "OK";
    pub const PENDING: &'static str = "X";
    pub const NOT_FOUND: &'static str = "Não encontrado";

    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            None => PillarStatus::NotFound,
            Some(Self::OK) => PillarStatus::Ok,
            Some(Self::PENDING) => PillarStatus::Pending,
            Some(Self::NOT_FOUND) | Some("Nao encontrado") => PillarStatus::NotFound,
            Some(other) => PillarStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PillarStatus::Ok => Self::OK,
            PillarStatus::Pending => Self::PENDING,
            PillarStatus::NotFound => Self::NOT_FOUND,
            PillarStatus::Other(value) => value,
        }
    }

    /// Label used by the student listing and detail view.
    pub fn display_label(&self) -> &'static str {
        match self {
            PillarStatus::Ok => "Completo",
            PillarStatus::Pending => "Pendente",
            _ => "Não encontrado",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            PillarStatus::Ok => "✅",
            PillarStatus::Pending => "❌",
            _ => "❓",
        }
    }
}

impl Serialize for PillarStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Pillar {
    Financeiro,
    Avaliacao,
    TempoMinimo,
    Documentos,
}

impl Pillar {
    pub const ALL: [Pillar; 4] = [
        Pillar::Financeiro,
        Pillar::Avaliacao,
        Pillar::TempoMinimo,
        Pillar::Documentos,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Pillar::Financeiro => "Financeiro",
            Pillar::Avaliacao => "Avaliação",
            Pillar::TempoMinimo => "Tempo Mín.",
            Pillar::Documentos => "Documentos",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub cpf: String,
    pub curso: String,
    pub turma: String,
    pub status_inscricao: String,
    pub cobrancas: String,
    pub disciplinas: String,
    pub financeiro: PillarStatus,
    pub avaliacao: PillarStatus,
    pub tempo_minimo: PillarStatus,
    pub documentos: PillarStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_inicio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_solic_digital: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_cert_digital: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_cert_digital: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_solic_impresso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_cert_impresso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_cert_impresso: Option<String>,
}

impl StudentRecord {
    pub fn pillar(&self, pillar: Pillar) -> &PillarStatus {
        match pillar {
            Pillar::Financeiro => &self.financeiro,
            Pillar::Avaliacao => &self.avaliacao,
            Pillar::TempoMinimo => &self.tempo_minimo,
            Pillar::Documentos => &self.documentos,
        }
    }

    /// Pillars explicitly marked as pending.
    pub fn pending_pillars(&self) -> Vec<Pillar> {
        Pillar::ALL
            .into_iter()
            .filter(|pillar| *self.pillar(*pillar) == PillarStatus::Pending)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    pub total_alunos: usize,
    pub percentual_em_dia: f64,
    pub percentual_inadimplente: f64,
    pub progresso_medio_disciplinas: f64,
    pub taxa_documentos_completos: f64,
    pub ultima_atualizacao: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DelinquencyBucket {
    EmDia,
    AtrasoLeve,
    AtrasoMedio,
    InadimplenteGrave,
}

impl DelinquencyBucket {
    pub const ALL: [DelinquencyBucket; 4] = [
        DelinquencyBucket::EmDia,
        DelinquencyBucket::AtrasoLeve,
        DelinquencyBucket::AtrasoMedio,
        DelinquencyBucket::InadimplenteGrave,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DelinquencyBucket::EmDia => "Em dia",
            DelinquencyBucket::AtrasoLeve => "Atraso leve",
            DelinquencyBucket::AtrasoMedio => "Atraso médio",
            DelinquencyBucket::InadimplenteGrave => "Inadimplente grave",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub bucket: DelinquencyBucket,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PillarTally {
    pub pillar: Pillar,
    pub ok: usize,
    pub pending: usize,
    pub not_found: usize,
    /// Values outside OK / X / Não encontrado, keyed by their literal text.
    pub other: BTreeMap<String, usize>,
}

impl PillarTally {
    pub fn new(pillar: Pillar) -> Self {
        Self {
            pillar,
            ok: 0,
            pending: 0,
            not_found: 0,
            other: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, status: &PillarStatus) {
        match status {
            PillarStatus::Ok => self.ok += 1,
            PillarStatus::Pending => self.pending += 1,
            PillarStatus::NotFound => self.not_found += 1,
            PillarStatus::Other(value) => *self.other.entry(value.clone()).or_insert(0) += 1,
        }
    }

    pub fn count(&self, status: &PillarStatus) -> usize {
        match status {
            PillarStatus::Ok => self.ok,
            PillarStatus::Pending => self.pending,
            PillarStatus::NotFound => self.not_found,
            PillarStatus::Other(value) => self.other.get(value).copied().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionView {
    pub status: Vec<StatusCount>,
    pub delinquency: Vec<BucketCount>,
    /// Records whose billing ratio is unparseable or has no installments billed.
    pub sem_avaliacao: usize,
    pub pillars: Vec<PillarTally>,
}

impl DistributionView {
    pub fn bucket(&self, bucket: DelinquencyBucket) -> usize {
        self.delinquency
            .iter()
            .find(|entry| entry.bucket == bucket)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    pub fn pillar(&self, pillar: Pillar) -> Option<&PillarTally> {
        self.pillars.iter().find(|tally| tally.pillar == pillar)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateCounts {
    pub solicitacoes_7d: u64,
    pub solicitacoes_30d: u64,
    pub solicitacoes_90d: u64,
}

/// Everything one pipeline run publishes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub run_id: Uuid,
    pub source: String,
    pub records: Vec<StudentRecord>,
    pub kpis: KpiSnapshot,
    pub distributions: DistributionView,
    pub certificates: CertificateCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_trims_and_treats_blank_as_missing() {
        let row: RawRow = [("Nome", "  Ana "), ("Email", "   ")].into_iter().collect();
        assert_eq!(row.get("Nome"), Some("Ana"));
        assert_eq!(row.get("Email"), None);
        assert_eq!(row.get("CPF"), None);
    }

    #[test]
    fn repeated_header_resolves_to_first_occurrence() {
        let row: RawRow = [("ID", "1"), ("ID", "2")].into_iter().collect();
        assert_eq!(row.get("ID"), Some("1"));
    }

    #[test]
    fn pillar_status_round_trips_its_label() {
        for value in ["OK", "X", "Não encontrado", "Parcial"] {
            assert_eq!(PillarStatus::from_value(Some(value)).as_str(), value);
        }
        assert_eq!(PillarStatus::from_value(None), PillarStatus::NotFound);
        assert_eq!(
            serde_json::to_string(&PillarStatus::Pending).unwrap(),
            "\"X\""
        );
    }

    #[test]
    fn tally_counts_every_category() {
        let mut tally = PillarTally::new(Pillar::Avaliacao);
        tally.record(&PillarStatus::Ok);
        tally.record(&PillarStatus::Other("?".to_string()));
        tally.record(&PillarStatus::Other("?".to_string()));
        assert_eq!(tally.count(&PillarStatus::Ok), 1);
        assert_eq!(tally.count(&PillarStatus::Pending), 0);
        assert_eq!(tally.count(&PillarStatus::Other("?".to_string())), 2);
    }
}
