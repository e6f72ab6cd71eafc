pub(super) const INSERT_INSPECTION: &str = r#"
    INSERT INTO inspections (
        id,
        valve_code,
        inspection_date,
        photo_initial_url,
        photo_during_url,
        photo_final_url,
        notes,
        status,
        created_at,
        updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
"#;

pub(super) const SELECT_INSPECTION_BY_ID: &str = r#"
    SELECT id, valve_code, inspection_date, photo_initial_url, photo_during_url,
           photo_final_url, notes, status
    FROM inspections
    WHERE id = ?1
"#;

pub(super) const DELETE_INSPECTION: &str = r#"
    DELETE FROM inspections
    WHERE id = ?1
"#;

pub(super) const SELECT_INSPECTIONS_BASE: &str = r#"
    SELECT id, valve_code, inspection_date, photo_initial_url, photo_during_url,
           photo_final_url, notes, status
    FROM inspections
    WHERE 1 = 1
"#;

pub(super) const COUNT_INSPECTIONS_BASE: &str = r#"
    SELECT COUNT(*) AS total
    FROM inspections
    WHERE 1 = 1
"#;
