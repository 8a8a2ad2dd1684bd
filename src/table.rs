use std::collections::BTreeSet;
use std::fmt::Write;

use crate::aggregate::progress_percentage;
use crate::models::{Pillar, StudentRecord};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Filters for the student listing. Empty filters match everything.
#[derive(Debug, Clone)]
pub struct StudentQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub curso: Option<String>,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
}

impl Default for StudentQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            curso: None,
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl StudentQuery {
    pub fn matches(&self, record: &StudentRecord) -> bool {
        let matches_search = match self.search.as_deref() {
            None | Some("") => true,
            Some(term) => {
                let needle = term.to_lowercase();
                record.nome.to_lowercase().contains(&needle)
                    || record.email.to_lowercase().contains(&needle)
                    || record.cpf.contains(term)
            }
        };
        let matches_status = self
            .status
            .as_deref()
            .map_or(true, |status| record.status_inscricao == status);
        let matches_curso = self
            .curso
            .as_deref()
            .map_or(true, |curso| record.curso == curso);

        matches_search && matches_status && matches_curso
    }
}

#[derive(Debug)]
pub struct StudentPage<'a> {
    pub students: Vec<&'a StudentRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

pub fn query_students<'a>(records: &'a [StudentRecord], query: &StudentQuery) -> StudentPage<'a> {
    let per_page = query.per_page.max(1);
    let page = query.page.max(1);
    let matches: Vec<&StudentRecord> = records.iter().filter(|r| query.matches(r)).collect();
    let total_matches = matches.len();

    StudentPage {
        students: matches
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect(),
        page,
        total_pages: total_matches.div_ceil(per_page),
        total_matches,
    }
}

/// Distinct non-empty enrollment statuses, for filter choices.
pub fn status_options(records: &[StudentRecord]) -> BTreeSet<&str> {
    records
        .iter()
        .map(|r| r.status_inscricao.as_str())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn curso_options(records: &[StudentRecord]) -> BTreeSet<&str> {
    records
        .iter()
        .map(|r| r.curso.as_str())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn find_student<'a>(records: &'a [StudentRecord], id: &str) -> Option<&'a StudentRecord> {
    records.iter().find(|r| r.id == id)
}

pub fn render_page(page: &StudentPage<'_>) -> String {
    let mut output = String::new();

    if page.students.is_empty() {
        let _ = writeln!(output, "No students match these filters.");
        return output;
    }

    for student in &page.students {
        let pillars: String = Pillar::ALL
            .iter()
            .map(|pillar| student.pillar(*pillar).icon())
            .collect();
        let _ = writeln!(
            output,
            "- [{}] {} <{}> | {} (Turma: {}) | {} | {} | cobranças {}",
            student.id,
            student.nome,
            student.email,
            student.curso,
            student.turma,
            student.status_inscricao,
            pillars,
            student.cobrancas
        );
    }

    let _ = writeln!(
        output,
        "Page {} of {} ({} students)",
        page.page, page.total_pages, page.total_matches
    );
    output
}

pub fn render_detail(student: &StudentRecord) -> String {
    let mut output = String::new();
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let _ = writeln!(output, "# {}", student.nome);
    let _ = writeln!(output, "ID: {}", student.id);
    let _ = writeln!(output, "Email: {}", student.email);
    let _ = writeln!(output, "CPF: {}", student.cpf);
    let _ = writeln!(output, "Curso: {} (Turma: {})", student.curso, student.turma);
    let _ = writeln!(output, "Status: {}", student.status_inscricao);
    let _ = writeln!(output, "Data de início: {}", optional(&student.data_inicio));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Pilares");
    for pillar in Pillar::ALL {
        let status = student.pillar(pillar);
        let _ = writeln!(
            output,
            "- {}: {} {}",
            pillar.label(),
            status.icon(),
            status.display_label()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Progresso");
    let _ = writeln!(output, "Cobranças pagas: {}", student.cobrancas);
    match progress_percentage(&student.disciplinas) {
        Some(progress) => {
            let _ = writeln!(
                output,
                "Disciplinas: {} ({:.1}%)",
                student.disciplinas, progress
            );
        }
        None => {
            let _ = writeln!(output, "Disciplinas: {}", student.disciplinas);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Certificados");
    if student.data_solic_digital.is_none() && student.data_solic_impresso.is_none() {
        let _ = writeln!(output, "Nenhum certificado solicitado.");
    }
    if student.data_solic_digital.is_some() {
        let _ = writeln!(
            output,
            "- Digital: solicitado em {}, tipo {}, status {}",
            optional(&student.data_solic_digital),
            optional(&student.tipo_cert_digital),
            optional(&student.status_cert_digital)
        );
    }
    if student.data_solic_impresso.is_some() {
        let _ = writeln!(
            output,
            "- Impresso: solicitado em {}, tipo {}, status {}",
            optional(&student.data_solic_impresso),
            optional(&student.tipo_cert_impresso),
            optional(&student.status_cert_impresso)
        );
    }

    output
}
