use crate::models::{PillarStatus, RawRow, StudentRecord};

pub const DEFAULT_RATIO: &str = "0/0";

/// Maps raw sheet rows onto canonical student records.
///
/// Never fails: missing or blank columns fall back to their defaults, and the
/// output has exactly one record per input row.
pub fn normalize(rows: &[RawRow]) -> Vec<StudentRecord> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| normalize_row(index, row))
        .collect()
}

pub fn normalize_row(index: usize, row: &RawRow) -> StudentRecord {
    let text = |headers: &[&str]| row.get_any(headers).unwrap_or_default().to_string();
    let optional = |headers: &[&str]| row.get_any(headers).map(str::to_string);
    let pillar = |headers: &[&str]| PillarStatus::from_value(row.get_any(headers));

    StudentRecord {
        id: row
            .get("ID")
            .map(str::to_string)
            .unwrap_or_else(|| format!("student-{index}")),
        nome: text(&["Nome"]),
        email: text(&["Email"]),
        cpf: text(&["CPF"]),
        curso: text(&["Curso"]),
        turma: text(&["Turma"]),
        status_inscricao: text(&["Status Inscrição", "Status Inscricao"]),
        cobrancas: row.get("Cobrancas").unwrap_or(DEFAULT_RATIO).to_string(),
        disciplinas: row.get("Disciplinas").unwrap_or(DEFAULT_RATIO).to_string(),
        financeiro: pillar(&["Financeiro"]),
        avaliacao: pillar(&["Avaliacao"]),
        tempo_minimo: pillar(&["Tempo Mínimo", "Tempo Minimo"]),
        documentos: pillar(&["Documentos"]),
        data_inicio: optional(&["Data Início", "Data Inicio"]),
        data_solic_digital: optional(&["Data Solic. Digital"]),
        tipo_cert_digital: optional(&["Tipo Cert. Digital"]),
        status_cert_digital: optional(&["Status Cert. Digital"]),
        data_solic_impresso: optional(&["Data Solic. Impresso"]),
        tipo_cert_impresso: optional(&["Tipo Cert. Impresso"]),
        status_cert_impresso: optional(&["Status Cert. Impresso"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn empty_row_gets_every_default() {
        let records = normalize(&[RawRow::new()]);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, "student-0");
        assert_eq!(record.nome, "");
        assert_eq!(record.status_inscricao, "");
        assert_eq!(record.cobrancas, "0/0");
        assert_eq!(record.disciplinas, "0/0");
        assert_eq!(record.financeiro, PillarStatus::NotFound);
        assert_eq!(record.documentos, PillarStatus::NotFound);
        assert_eq!(record.data_inicio, None);
        assert_eq!(record.status_cert_impresso, None);
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let records = normalize(&[row(&[("Observacao", "qualquer"), ("Nome", "Ana")])]);
        assert_eq!(records[0].nome, "Ana");
    }

    #[test]
    fn missing_financeiro_defaults_to_not_found() {
        let records = normalize(&[row(&[("Nome", "Ana"), ("Avaliacao", "OK")])]);
        assert_eq!(records[0].financeiro.as_str(), "Não encontrado");
        assert_eq!(records[0].avaliacao, PillarStatus::Ok);
    }

    #[test]
    fn ascii_aliases_are_used_when_accented_columns_are_absent() {
        let records = normalize(&[row(&[
            ("Status Inscricao", "Trancado"),
            ("Tempo Minimo", "X"),
            ("Data Inicio", "01/02/2024"),
        ])]);
        let record = &records[0];
        assert_eq!(record.status_inscricao, "Trancado");
        assert_eq!(record.tempo_minimo, PillarStatus::Pending);
        assert_eq!(record.data_inicio.as_deref(), Some("01/02/2024"));
    }

    #[test]
    fn accented_column_wins_over_ascii_alias() {
        let records = normalize(&[row(&[
            ("Status Inscricao", "Evadido"),
            ("Status Inscrição", "Ativo"),
        ])]);
        assert_eq!(records[0].status_inscricao, "Ativo");
    }

    #[test]
    fn blank_accented_column_falls_through_to_alias() {
        let records = normalize(&[row(&[
            ("Status Inscrição", ""),
            ("Status Inscricao", "Concluído"),
        ])]);
        assert_eq!(records[0].status_inscricao, "Concluído");
    }

    #[test]
    fn positional_ids_fill_in_missing_id_column() {
        let rows = vec![
            row(&[("Nome", "Ana")]),
            row(&[("Nome", "Beto"), ("ID", "42")]),
            row(&[("Nome", "Caio"), ("ID", " ")]),
        ];
        let ids: Vec<String> = normalize(&rows).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["student-0", "42", "student-2"]);
    }

    #[test]
    fn blank_certificate_fields_are_absent() {
        let records = normalize(&[row(&[
            ("Data Solic. Digital", ""),
            ("Tipo Cert. Digital", "Conclusão"),
            ("Status Cert. Impresso", "   "),
        ])]);
        let record = &records[0];
        assert_eq!(record.data_solic_digital, None);
        assert_eq!(record.tipo_cert_digital.as_deref(), Some("Conclusão"));
        assert_eq!(record.status_cert_impresso, None);
    }

    #[test]
    fn unrecognized_pillar_value_is_kept_verbatim() {
        let records = normalize(&[row(&[("Documentos", "Em análise")])]);
        assert_eq!(
            records[0].documentos,
            PillarStatus::Other("Em análise".to_string())
        );
    }
}
