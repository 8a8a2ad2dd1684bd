use std::fmt::Write;

use crate::models::{Pillar, PillarStatus, Snapshot};

pub fn build_report(snapshot: &Snapshot, last_error: Option<&str>) -> String {
    let kpis = &snapshot.kpis;
    let view = &snapshot.distributions;
    let mut output = String::new();

    let _ = writeln!(output, "# Dashboard de Controle Acadêmico");
    let _ = writeln!(
        output,
        "Última atualização: {} (fonte: {})",
        kpis.ultima_atualizacao.format("%d/%m/%Y %H:%M:%S UTC"),
        snapshot.source
    );
    if let Some(error) = last_error {
        let _ = writeln!(output, "Aviso: a última atualização falhou ({error})");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Indicadores");
    let _ = writeln!(output, "- Total de alunos: {}", kpis.total_alunos);
    let _ = writeln!(
        output,
        "- Taxa de inadimplência: {:.1}% ({:.1}% em dia)",
        kpis.percentual_inadimplente, kpis.percentual_em_dia
    );
    let _ = writeln!(
        output,
        "- Progresso médio: {:.1}% das disciplinas cursadas",
        kpis.progresso_medio_disciplinas
    );
    let _ = writeln!(
        output,
        "- Documentos completos: {:.1}%",
        kpis.taxa_documentos_completos
    );

    let certificates = &snapshot.certificates;
    let _ = writeln!(output);
    let _ = writeln!(output, "## Solicitações de Certificados");
    let _ = writeln!(output, "- 7 dias: {}", certificates.solicitacoes_7d);
    let _ = writeln!(output, "- 30 dias: {}", certificates.solicitacoes_30d);
    let _ = writeln!(output, "- 90 dias: {}", certificates.solicitacoes_90d);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Status de Inscrição");
    if view.status.is_empty() {
        let _ = writeln!(output, "Nenhum aluno carregado.");
    } else {
        for entry in &view.status {
            let label = if entry.status.is_empty() {
                "(sem status)"
            } else {
                entry.status.as_str()
            };
            let _ = writeln!(output, "- {}: {}", label, entry.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Inadimplência");
    for entry in &view.delinquency {
        let _ = writeln!(
            output,
            "- {}: {} ({:.1}%)",
            entry.bucket.label(),
            entry.count,
            entry.percentage
        );
    }
    if view.sem_avaliacao > 0 {
        let _ = writeln!(output, "- Sem cobranças avaliáveis: {}", view.sem_avaliacao);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Status dos Pilares");
    let _ = writeln!(output, "| Pilar | OK | Pendente | Não encontrado |");
    let _ = writeln!(output, "|---|---|---|---|");
    for tally in &view.pillars {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            tally.pillar.label(),
            tally.ok,
            tally.pending,
            tally.not_found
        );
    }
    for tally in view.pillars.iter().filter(|t| !t.other.is_empty()) {
        for (value, count) in &tally.other {
            let _ = writeln!(
                output,
                "- {} com valor não reconhecido \"{}\": {}",
                tally.pillar.label(),
                value,
                count
            );
        }
    }

    let pending: Vec<_> = snapshot
        .records
        .iter()
        .filter(|record| !record.pending_pillars().is_empty())
        .collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Alunos com Pilares Pendentes");
    if pending.is_empty() {
        let _ = writeln!(output, "Nenhuma pendência registrada.");
    } else {
        for record in pending.iter().take(20) {
            let pillars: Vec<&str> = record
                .pending_pillars()
                .into_iter()
                .map(Pillar::label)
                .collect();
            let _ = writeln!(
                output,
                "- {} ({}, {}): {}",
                record.nome,
                record.email,
                record.curso,
                pillars.join(", ")
            );
        }
        if pending.len() > 20 {
            let _ = writeln!(output, "- ... e mais {} alunos", pending.len() - 20);
        }
    }

    output
}

/// Short terminal summary mirroring the dashboard cards.
pub fn build_summary(snapshot: &Snapshot) -> String {
    let kpis = &snapshot.kpis;
    let documentos_ok = snapshot
        .distributions
        .pillar(Pillar::Documentos)
        .map(|tally| tally.count(&PillarStatus::Ok))
        .unwrap_or(0);
    let mut output = String::new();

    let _ = writeln!(output, "Total de alunos: {}", kpis.total_alunos);
    let _ = writeln!(
        output,
        "Taxa de inadimplência: {:.1}% ({:.1}% em dia)",
        kpis.percentual_inadimplente, kpis.percentual_em_dia
    );
    let _ = writeln!(
        output,
        "Progresso médio: {:.1}%",
        kpis.progresso_medio_disciplinas
    );
    let _ = writeln!(
        output,
        "Documentos completos: {:.1}% ({} alunos)",
        kpis.taxa_documentos_completos, documentos_ok
    );
    let _ = writeln!(
        output,
        "Certificados solicitados: {} (7d), {} (30d), {} (90d)",
        snapshot.certificates.solicitacoes_7d,
        snapshot.certificates.solicitacoes_30d,
        snapshot.certificates.solicitacoes_90d
    );
    output
}
