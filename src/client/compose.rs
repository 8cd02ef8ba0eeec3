//! Message bodies for the email and chat channels.

use crate::constants::REPORT_DATE_FORMAT;
use crate::models::{NewContract, ReconciliationStatus, RunReport};
use chrono::{DateTime, Local};
use std::fmt::Write;

pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn new_contracts_email(contracts: &[NewContract], now: DateTime<Local>) -> EmailMessage {
    let mut body = String::from(
        "<h2>Novos Contratos Incluídos no Sistema de Assinatura</h2>\
         <p>Os seguintes contratos foram processados e aguardam revisão:</p>\
         <table border=\"1\"><tr><th>Número do Contrato</th><th>Cliente</th><th>Data de Processamento</th></tr>",
    );
    let processed_at = now.format("%d/%m/%Y %H:%M");
    for contract in contracts {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&contract.number),
            escape_html(&contract.client),
            processed_at
        );
    }
    body.push_str("</table>");

    EmailMessage {
        subject: format!(
            "Novos Contratos para Assinatura - {}",
            now.format(REPORT_DATE_FORMAT)
        ),
        html_body: body,
    }
}

pub fn report_email(report: &RunReport) -> EmailMessage {
    let mut body = format!(
        "<h2>Relatório Diário - {}</h2>\
         <p>Novos contratos enviados para assinatura: <b>{}</b></p>\
         <p>Contratos assinados recebidos: <b>{}</b> (confirmados no Maxycon: <b>{}</b>)</p>",
        escape_html(&report.date),
        report.total_new,
        report.total_finalized,
        report.confirmed_count()
    );

    if !report.new_contracts.is_empty() {
        body.push_str("<h3>Novos contratos</h3><table border=\"1\"><tr><th>Número</th><th>Cliente</th><th>Entrada</th></tr>");
        for contract in &report.new_contracts {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&contract.number),
                escape_html(&contract.client),
                escape_html(&contract.entry_date)
            );
        }
        body.push_str("</table>");
    }

    if !report.finalized_contracts.is_empty() {
        body.push_str("<h3>Contratos finalizados</h3><table border=\"1\"><tr><th>Arquivo</th><th>Recebido em</th><th>Situação no Maxycon</th></tr>");
        for contract in &report.finalized_contracts {
            let situation = match &contract.reconciliation {
                ReconciliationStatus::Confirmed => "Finalizado".to_string(),
                ReconciliationStatus::Pending => "Pendente".to_string(),
                ReconciliationStatus::Failed { reason } => format!("Falhou: {}", escape_html(reason)),
            };
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&contract.file_name),
                contract.received_at.format("%d/%m/%Y %H:%M"),
                situation
            );
        }
        body.push_str("</table>");
    }

    EmailMessage {
        subject: format!("Relatório Diário de Contratos - {}", report.date),
        html_body: body,
    }
}

pub fn daily_summary_chat(contracts: &[NewContract], now: DateTime<Local>) -> String {
    let mut message = format!(
        "*Resumo Diário de Contratos - {}*\n\n*Contratos Processados Hoje:*\n",
        now.format(REPORT_DATE_FORMAT)
    );
    for contract in contracts {
        let _ = write!(
            message,
            "\nContrato: {}\nCliente: {}\nProcessado em: {}\n-------------------",
            contract.number,
            contract.client,
            now.format("%H:%M")
        );
    }
    let _ = write!(
        message,
        "\n\n*Total de contratos processados: {}*",
        contracts.len()
    );
    message
}

pub fn error_alert_chat(error: &str, now: DateTime<Local>) -> String {
    format!(
        "*ALERTA DE ERRO*\n{}\n\n{}\n\nPor favor, verificar o sistema.",
        now.format("%d/%m/%Y %H:%M"),
        error
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 19, 12, 30, 0).unwrap()
    }

    fn contract(number: &str, client: &str) -> NewContract {
        NewContract {
            id: number.to_string(),
            number: number.to_string(),
            client: client.to_string(),
            entry_date: "18/10/2026".to_string(),
            status: "Pendente Assinatura".to_string(),
        }
    }

    #[test]
    fn test_new_contracts_email_lists_every_contract() {
        let message = new_contracts_email(
            &[contract("123", "Cliente A"), contract("456", "Silva & Filhos")],
            at_noon(),
        );
        assert_eq!(message.subject, "Novos Contratos para Assinatura - 19/10/2026");
        assert!(message.html_body.contains("<td>123</td>"));
        assert!(message.html_body.contains("Silva &amp; Filhos"));
        assert!(message.html_body.contains("19/10/2026 12:30"));
    }

    #[test]
    fn test_daily_summary_counts() {
        let text = daily_summary_chat(&[contract("1", "A"), contract("2", "B")], at_noon());
        assert!(text.contains("Contrato: 1"));
        assert!(text.contains("Cliente: B"));
        assert!(text.ends_with("*Total de contratos processados: 2*"));
    }

    #[test]
    fn test_error_alert_carries_error_text() {
        let text = error_alert_chat("listing failed: timeout", at_noon());
        assert!(text.contains("listing failed: timeout"));
        assert!(text.starts_with("*ALERTA DE ERRO*"));
    }

    #[test]
    fn test_report_email_marks_unconfirmed_items() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut failed = crate::models::FinalizedContract::received(
            "contrato_9.pdf",
            std::path::PathBuf::from("contratos/finalizados/contrato_9.pdf"),
        );
        failed.reconciliation = ReconciliationStatus::Failed {
            reason: "upload timed out".to_string(),
        };
        let report = RunReport::build(date, &[], &[failed]);

        let message = report_email(&report);
        assert_eq!(message.subject, "Relatório Diário de Contratos - 19/10/2026");
        assert!(message.html_body.contains("Falhou: upload timed out"));
        assert!(message.html_body.contains("confirmados no Maxycon: <b>0</b>"));
    }
}
