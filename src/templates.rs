//! Starter documents
//!
//! Applying a template replaces the markdown body, header and footer of a
//! document snapshot in one step; presentation settings are left alone.

/// A static seed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub markdown: &'static str,
    pub header: &'static str,
    pub footer: &'static str,
}

pub static TEMPLATES: [Template; 3] = [
    Template {
        id: "blank",
        name: "Blank",
        description: "Empty document to start from scratch",
        markdown: "# Novo Documento\n\nComece a escrever aqui...",
        header: "",
        footer: "",
    },
    Template {
        id: "bioq",
        name: "Biochemistry",
        description: "Full lesson with tables and Mermaid diagrams",
        markdown: "# Metabolismo da Glicose\n\
\n\
## Introdução\n\
A glicólise é a via metabólica que converte glicose em piruvato.\n\
\n\
### Ciclo de Reações\n\
\n\
| Fase | Reação | Enzima |\n\
| :--- | :--- | :--- |\n\
| 1 | Fosforilação | Hexocinase |\n\
| 2 | Isomerização | Fosfoglicose isomerase |\n\
\n\
## Fluxograma do Processo\n\
\n\
```mermaid\n\
graph TD\n\
\x20   A[Glicose] --> B[Glicose-6-P]\n\
\x20   B --> C[Frutose-6-P]\n\
\x20   C --> D[Piruvato]\n\
\x20   D --> E{Oxigênio?}\n\
\x20   E -- Sim --> F[Ciclo de Krebs]\n\
\x20   E -- Não --> G[Lactato]\n\
```\n\
\n\
## Notas Adicionais\n\
- Ocorre no citosol\n\
- Rendimento líquido de 2 ATP",
        header: "StaticMD | Material Didático de Bioquímica",
        footer: "Página {page} - Universidade Exemplo",
    },
    Template {
        id: "corp",
        name: "Corporate Report",
        description: "Executive report with a professional header and footer",
        markdown: "# Relatório Executivo Trimestral\n\
\n\
## Sumário Executivo\n\
Este documento detalha o desempenho operacional do Q3.\n\
\n\
### Resultados Principais\n\
1. Aumento de **25%** na eficiência.\n\
2. Redução de custos em **10%**.\n\
\n\
## Análise de Fluxo\n\
\n\
```mermaid\n\
graph LR\n\
\x20   I[Início] --> P[Processamento]\n\
\x20   P --> O[Output]\n\
\x20   O --> R[Revisão]\n\
\x20   R --> I\n\
```\n\
\n\
> \"A inovação diferencia um líder de um seguidor.\" - Steve Jobs",
        header: "**RELATÓRIO DE DESEMPENHO** | Confidencial",
        footer: "© 2024 Corporação Alpha - Todos os direitos reservados",
    },
];

/// Template used for a brand new session
pub const DEFAULT_TEMPLATE_ID: &str = "bioq";

/// Find a template by id
pub fn find(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// The template a fresh session starts from
pub fn default_template() -> &'static Template {
    find(DEFAULT_TEMPLATE_ID).unwrap_or(&TEMPLATES[0])
}
