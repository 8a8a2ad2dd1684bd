use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{
    BucketCount, DelinquencyBucket, DistributionView, KpiSnapshot, Pillar, PillarStatus,
    PillarTally, StatusCount, StudentRecord,
};
use crate::ratio::{parse_ratio, Ratio};

/// How a record's billing ratio reads for delinquency purposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BillingStanding {
    /// Unparseable, or no installments billed yet.
    Unassessed,
    Assessed(DelinquencyBucket),
}

impl BillingStanding {
    pub fn is_delinquent(self) -> bool {
        matches!(self, BillingStanding::Assessed(bucket) if bucket != DelinquencyBucket::EmDia)
    }
}

pub fn bucket_for_fraction(fraction: f64) -> DelinquencyBucket {
    if fraction >= 1.0 {
        DelinquencyBucket::EmDia
    } else if fraction >= 0.8 {
        DelinquencyBucket::AtrasoLeve
    } else if fraction >= 0.5 {
        DelinquencyBucket::AtrasoMedio
    } else {
        DelinquencyBucket::InadimplenteGrave
    }
}

pub fn billing_standing(cobrancas: &str) -> BillingStanding {
    match parse_ratio(cobrancas).ok().and_then(Ratio::fraction) {
        Some(fraction) => BillingStanding::Assessed(bucket_for_fraction(fraction)),
        None => BillingStanding::Unassessed,
    }
}

/// Completion percentage for one record, or `None` when it cannot be computed.
pub fn progress_percentage(disciplinas: &str) -> Option<f64> {
    parse_ratio(disciplinas)
        .ok()
        .and_then(Ratio::fraction)
        .map(|fraction| fraction * 100.0)
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn compute_kpis(records: &[StudentRecord], at: DateTime<Utc>) -> KpiSnapshot {
    let total = records.len();
    let inadimplentes = records
        .iter()
        .filter(|record| billing_standing(&record.cobrancas).is_delinquent())
        .count();
    let progress_sum: f64 = records
        .iter()
        .filter_map(|record| progress_percentage(&record.disciplinas))
        .sum();
    let documentos_ok = records
        .iter()
        .filter(|record| record.documentos == PillarStatus::Ok)
        .count();

    KpiSnapshot {
        total_alunos: total,
        percentual_em_dia: percentage(total - inadimplentes, total),
        percentual_inadimplente: percentage(inadimplentes, total),
        progresso_medio_disciplinas: if total == 0 {
            0.0
        } else {
            progress_sum / total as f64
        },
        taxa_documentos_completos: percentage(documentos_ok, total),
        ultima_atualizacao: at,
    }
}

/// Record count per literal status, most frequent first, ties alphabetical.
pub fn status_distribution(records: &[StudentRecord]) -> Vec<StatusCount> {
    let mut map: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *map.entry(record.status_inscricao.as_str()).or_insert(0) += 1;
    }

    let mut counts: Vec<StatusCount> = map
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.to_string(),
            count,
        })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    counts
}

pub fn delinquency_distribution(records: &[StudentRecord]) -> (Vec<BucketCount>, usize) {
    let mut counts: HashMap<DelinquencyBucket, usize> = HashMap::new();
    let mut unassessed = 0usize;

    for record in records {
        match billing_standing(&record.cobrancas) {
            BillingStanding::Assessed(bucket) => *counts.entry(bucket).or_insert(0) += 1,
            BillingStanding::Unassessed => unassessed += 1,
        }
    }

    let buckets = DelinquencyBucket::ALL
        .into_iter()
        .map(|bucket| {
            let count = counts.get(&bucket).copied().unwrap_or(0);
            BucketCount {
                bucket,
                count,
                percentage: percentage(count, records.len()),
            }
        })
        .collect();

    (buckets, unassessed)
}

pub fn pillar_tally(records: &[StudentRecord]) -> Vec<PillarTally> {
    let mut tallies: Vec<PillarTally> = Pillar::ALL.into_iter().map(PillarTally::new).collect();

    for record in records {
        for tally in tallies.iter_mut() {
            tally.record(record.pillar(tally.pillar));
        }
    }

    tallies
}

pub fn distributions(records: &[StudentRecord]) -> DistributionView {
    let (delinquency, sem_avaliacao) = delinquency_distribution(records);

    DistributionView {
        status: status_distribution(records),
        delinquency,
        sem_avaliacao,
        pillars: pillar_tally(records),
    }
}

/// KPIs and breakdowns for `records`, stamped with the given time.
pub fn aggregate_at(
    records: &[StudentRecord],
    at: DateTime<Utc>,
) -> (KpiSnapshot, DistributionView) {
    (compute_kpis(records, at), distributions(records))
}

pub fn aggregate(records: &[StudentRecord]) -> (KpiSnapshot, DistributionView) {
    aggregate_at(records, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRow;
    use crate::normalize::normalize;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn record(fields: &[(&str, &str)]) -> StudentRecord {
        let row: RawRow = fields.iter().copied().collect();
        normalize(&[row]).remove(0)
    }

    fn billing(values: &[&str]) -> Vec<StudentRecord> {
        values
            .iter()
            .map(|value| record(&[("Cobrancas", value)]))
            .collect()
    }

    #[test]
    fn empty_set_is_all_zero() {
        let (kpis, view) = aggregate_at(&[], fixed_time());
        assert_eq!(kpis.total_alunos, 0);
        assert_eq!(kpis.percentual_em_dia, 0.0);
        assert_eq!(kpis.percentual_inadimplente, 0.0);
        assert_eq!(kpis.progresso_medio_disciplinas, 0.0);
        assert_eq!(kpis.taxa_documentos_completos, 0.0);
        assert!(view.status.is_empty());
        assert_eq!(view.sem_avaliacao, 0);
        assert_eq!(view.pillars.len(), 4);
        for tally in &view.pillars {
            assert_eq!((tally.ok, tally.pending, tally.not_found), (0, 0, 0));
        }
        assert!(view.delinquency.iter().all(|b| b.count == 0 && b.percentage == 0.0));
    }

    #[test]
    fn em_dia_and_inadimplente_sum_to_one_hundred() {
        let records = billing(&["10/10", "3/10", "garbage", "0/0", "7/9", "12/10"]);
        let (kpis, _) = aggregate_at(&records, fixed_time());
        assert!((kpis.percentual_em_dia + kpis.percentual_inadimplente - 100.0).abs() < 1e-9);
        assert!((kpis.percentual_inadimplente - 2.0 / 6.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(bucket_for_fraction(1.0), DelinquencyBucket::EmDia);
        assert_eq!(bucket_for_fraction(0.8), DelinquencyBucket::AtrasoLeve);
        assert_eq!(bucket_for_fraction(0.5), DelinquencyBucket::AtrasoMedio);
        assert_eq!(bucket_for_fraction(0.49999), DelinquencyBucket::InadimplenteGrave);
        assert_eq!(bucket_for_fraction(1.2), DelinquencyBucket::EmDia);
    }

    #[test]
    fn buckets_from_ratio_strings() {
        let records = billing(&["8/10", "5/10", "49999/100000", "4/4", "abc", "0/0"]);
        let (_, view) = aggregate_at(&records, fixed_time());
        assert_eq!(view.bucket(DelinquencyBucket::EmDia), 1);
        assert_eq!(view.bucket(DelinquencyBucket::AtrasoLeve), 1);
        assert_eq!(view.bucket(DelinquencyBucket::AtrasoMedio), 1);
        assert_eq!(view.bucket(DelinquencyBucket::InadimplenteGrave), 1);
        assert_eq!(view.sem_avaliacao, 2);
    }

    #[test]
    fn delinquent_buckets_match_kpi_count() {
        let records = billing(&["1/2", "9/10", "2/2", "x/y", "0/5", "3/0"]);
        let (kpis, view) = aggregate_at(&records, fixed_time());
        let delinquent = view.bucket(DelinquencyBucket::AtrasoLeve)
            + view.bucket(DelinquencyBucket::AtrasoMedio)
            + view.bucket(DelinquencyBucket::InadimplenteGrave);
        let expected = kpis.percentual_inadimplente / 100.0 * kpis.total_alunos as f64;
        assert!((delinquent as f64 - expected).abs() < 1e-9);
        let bucketed: usize = view.delinquency.iter().map(|b| b.count).sum();
        assert_eq!(bucketed + view.sem_avaliacao, records.len());
    }

    #[test]
    fn progress_average_divides_by_population() {
        let records = vec![
            record(&[("Disciplinas", "5/10")]),
            record(&[("Disciplinas", "invalid")]),
        ];
        let (kpis, _) = aggregate_at(&records, fixed_time());
        assert!((kpis.progresso_medio_disciplinas - 25.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_progress_contributes_nothing() {
        let records = vec![record(&[("Disciplinas", "0/0")]), record(&[])];
        let (kpis, _) = aggregate_at(&records, fixed_time());
        assert_eq!(kpis.progresso_medio_disciplinas, 0.0);
    }

    #[test]
    fn pillar_categories_present_even_when_unused() {
        let records = vec![
            record(&[("Documentos", "OK")]),
            record(&[("Documentos", "OK")]),
        ];
        let (kpis, view) = aggregate_at(&records, fixed_time());
        let documentos = view.pillar(Pillar::Documentos).unwrap();
        assert_eq!(documentos.ok, 2);
        assert_eq!(documentos.pending, 0);
        assert_eq!(documentos.not_found, 0);
        assert_eq!(kpis.taxa_documentos_completos, 100.0);
        let financeiro = view.pillar(Pillar::Financeiro).unwrap();
        assert_eq!(financeiro.not_found, 2);
    }

    #[test]
    fn unknown_values_keep_their_own_category() {
        let records = vec![
            record(&[("Status Inscrição", "Ativo"), ("Financeiro", "Parcial")]),
            record(&[("Status Inscrição", "Transferido"), ("Financeiro", "Parcial")]),
            record(&[("Status Inscrição", "Ativo"), ("Financeiro", "OK")]),
        ];
        let (_, view) = aggregate_at(&records, fixed_time());
        assert_eq!(
            view.status,
            vec![
                StatusCount {
                    status: "Ativo".to_string(),
                    count: 2
                },
                StatusCount {
                    status: "Transferido".to_string(),
                    count: 1
                },
            ]
        );
        let financeiro = view.pillar(Pillar::Financeiro).unwrap();
        assert_eq!(
            financeiro.count(&PillarStatus::Other("Parcial".to_string())),
            2
        );
        assert_eq!(financeiro.ok, 1);
    }

    #[test]
    fn bucket_percentages_use_whole_population() {
        let records = billing(&["10/10", "garbage"]);
        let (_, view) = aggregate_at(&records, fixed_time());
        let em_dia = &view.delinquency[0];
        assert_eq!(em_dia.bucket, DelinquencyBucket::EmDia);
        assert_eq!(em_dia.percentage, 50.0);
    }

    #[test]
    fn aggregation_is_reproducible() {
        let records = billing(&["1/3", "3/3", "2/3"]);
        assert_eq!(
            aggregate_at(&records, fixed_time()),
            aggregate_at(&records, fixed_time())
        );
    }
}
