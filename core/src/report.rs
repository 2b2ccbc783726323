use crate::rules::Finding;

pub const ALERT_SUBJECT: &str = "AWS Security & Compliance Issues Detected";

/// 把发现列表整理成一封告警正文。顺序保持聚合顺序，一行结论一行建议
pub fn format_report(findings: &[Finding]) -> String {
    findings
        .iter()
        .map(|finding| {
            format!(
                "{}: {}\nSuggested Remediation: {}",
                finding.category, finding.description, finding.remediation
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
