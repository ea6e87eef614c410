//! Display-field derivation for the web front end. Every function is a pure
//! transformation of one record or field; enrichment clones the record and
//! only ever adds fields, so the original provider data survives intact.

use crate::domain::model::Record;
use serde_json::Value;

/// Null sentinel some providers emit for an unset date bound.
const NULL_DATE: &str = "00000000";

pub const DEADLINE_UNDECIDED: &str = "미정";
pub const ALWAYS_OPEN: &str = "상시접수";
pub const SCOPE_UNKNOWN: &str = "범위미상";

/// `"YYYYMMDD"` → `"YYYY.MM.DD"`, anything that is not exactly 8 characters
/// → `""` (rendered as "미정" by the job formatter).
pub fn format_deadline(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() != 8 {
        return String::new();
    }
    let part = |range: std::ops::Range<usize>| chars[range].iter().collect::<String>();
    format!("{}.{}.{}", part(0..4), part(4..6), part(6..8))
}

/// `"YYYYMMDD"` → `"YYYY년 MM월 DD일"`; non-date text passes through
/// unchanged.
pub fn format_date(raw: &str) -> String {
    if raw.len() == 8 && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("{}년 {}월 {}일", &raw[..4], &raw[4..6], &raw[6..])
    } else {
        raw.to_string()
    }
}

/// Apply-period text, which arrives either as a single date or as
/// `"start ~ end"`. Empty stays empty; the policy formatter renders that as
/// "상시접수".
pub fn format_apply_period(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = raw.split(" ~ ").collect();
    if parts.len() == 2 {
        return format!(
            "{} ~ {}",
            format_date(parts[0].trim()),
            format_date(parts[1].trim())
        );
    }
    format_date(raw)
}

fn date_present(raw: &str) -> bool {
    !raw.trim().is_empty() && raw != NULL_DATE
}

/// Business-period range. `"00000000"` and blank bounds are excluded from
/// range construction; a single present bound renders open-ended.
pub fn format_business_period(start: &str, end: &str) -> String {
    match (date_present(start), date_present(end)) {
        (true, true) => format!("{} ~ {}", format_date(start), format_date(end)),
        (true, false) => format!("{} ~", format_date(start)),
        (false, true) => format!("~ {}", format_date(end)),
        (false, false) => String::new(),
    }
}

/// Comma-separated work-region list condensed for display.
pub fn format_region_display(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let count = raw.split(',').count();
    if count >= 10 {
        format!("전국 ({}개 지역)", count)
    } else if count > 3 {
        let first = raw.split(',').next().unwrap_or(raw);
        format!("{} 외 {}개 지역", first, count - 1)
    } else {
        raw.to_string()
    }
}

/// Policy coverage classified by the size of its zip-code list.
pub fn format_scope(zip_codes: &str) -> String {
    if zip_codes.is_empty() {
        return SCOPE_UNKNOWN.to_string();
    }
    let count = zip_codes.split(',').count();
    if count >= 50 {
        format!("전국 ({}개 지역)", count)
    } else if count > 10 {
        format!("광역 ({}개 지역)", count)
    } else if count > 1 {
        format!("다지역 ({}개 지역)", count)
    } else {
        "지역특화".to_string()
    }
}

fn put(record: &mut Record, key: &str, value: impl Into<String>) {
    record
        .fields
        .insert(key.to_string(), Value::String(value.into()));
}

/// Job listing enriched with the display fields the front end renders.
pub fn format_job(job: &Record, display_number: usize) -> Record {
    let title = job.text_or("recrutPbancTtl", "제목 없음");
    let company = job.text_or("instNm", "기관명 없음");
    let hire_type = job.text("hireTypeNmLst");
    let deadline = format_deadline(job.text("pbancEndYmd"));

    let mut out = job.clone();
    out.fields.insert(
        "display_number".to_string(),
        Value::from(display_number as u64),
    );
    put(
        &mut out,
        "display_title",
        format!("{}. {} ({})", display_number, company, hire_type),
    );
    put(&mut out, "formatted_title", title);
    put(&mut out, "formatted_company", company);
    put(&mut out, "formatted_hire_type", hire_type);
    put(
        &mut out,
        "formatted_region",
        format_region_display(job.text("workRgnNmLst")),
    );
    put(
        &mut out,
        "formatted_deadline",
        if deadline.is_empty() {
            DEADLINE_UNDECIDED.to_string()
        } else {
            deadline
        },
    );
    put(&mut out, "formatted_ncs_field", job.text("ncsCdNmLst"));

    // Flattened convenience aliases the front end reads directly.
    put(&mut out, "acbg_cond", job.text("acbgCondLst"));
    put(&mut out, "career_cond", job.text("creerCondLst"));
    put(&mut out, "major_field", job.text("mjrfldNmLst"));
    put(&mut out, "recruit_count", job.text("rcritNmprCo"));
    put(&mut out, "work_type", job.text("workTypeNmLst"));
    put(&mut out, "salary_type", job.text("salaryTypeNmLst"));
    put(&mut out, "contact_info", job.text("cntctNo"));
    put(&mut out, "recruit_start_date", job.text("pbancBgngYmd"));
    put(&mut out, "application_method", job.text("aplyMthdNmLst"));
    out
}

/// Youth policy enriched with the display fields the front end renders.
pub fn format_policy(policy: &Record, display_number: usize) -> Record {
    let apply_period = format_apply_period(policy.text("aplyYmd"));
    let policy_no = policy.text("plcyNo");
    let detail_url = if policy_no.is_empty() {
        String::new()
    } else {
        format!(
            "https://www.youthcenter.go.kr/youthPolicy/ythPlcyTotalSearch/ythPlcyDetail/{}",
            policy_no
        )
    };
    let support_scale = policy.text("sprtSclCnt");

    let mut out = policy.clone();
    put(
        &mut out,
        "display_title",
        format!("{}. {}", display_number, policy.text_or("plcyNm", "정책명 없음")),
    );
    put(
        &mut out,
        "formatted_explanation",
        policy.text_or("plcyExplnCn", "설명 없음"),
    );
    put(
        &mut out,
        "category_display",
        format!("{} > {}", policy.text("lclsfNm"), policy.text("mclsfNm")),
    );
    put(&mut out, "scope_display", format_scope(policy.text("zipCd")));
    put(&mut out, "keywords_display", policy.text("plcyKywdNm"));
    put(&mut out, "institution_display", policy.text("sprvsnInstCdNm"));
    put(&mut out, "support_content_display", policy.text("plcySprtCn"));
    put(
        &mut out,
        "business_period_display",
        format_business_period(policy.text("bizPrdBgngYmd"), policy.text("bizPrdEndYmd")),
    );
    put(
        &mut out,
        "apply_period_display",
        if apply_period.is_empty() {
            ALWAYS_OPEN.to_string()
        } else {
            apply_period
        },
    );
    put(
        &mut out,
        "support_scale_display",
        if support_scale.is_empty() || support_scale == "0" {
            String::new()
        } else {
            format!("{}명", support_scale)
        },
    );
    put(&mut out, "apply_method_display", policy.text("plcyAplyMthdCn"));
    put(
        &mut out,
        "additional_conditions_display",
        policy.text("addAplyQlfcCndCn"),
    );
    put(
        &mut out,
        "participation_target_display",
        policy.text("ptcpPrpTrgtCn"),
    );
    put(&mut out, "detail_url", detail_url);
    out
}
