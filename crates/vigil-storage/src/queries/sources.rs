// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain source queries: employees, medical exams, trainings and equipment.
//!
//! Dates are stored as `YYYY-MM-DD` text, so lexical comparison in SQL is
//! date comparison. "Latest record" queries rely on SQLite's bare-column
//! rule: with a single `MAX()` aggregate, the other selected columns come
//! from the row holding the maximum.

use std::collections::HashSet;

use chrono::NaiveDate;
use rusqlite::params;
use vigil_core::VigilError;
use vigil_core::types::{
    Employee, EquipmentCheck, EquipmentRecord, MedicalExamRecord, OrganizationId, TrainingKind,
    TrainingRecord,
};

use crate::database::{Database, map_tr_err};

pub async fn active_employees(
    db: &Database,
    organization_id: &OrganizationId,
) -> Result<Vec<Employee>, VigilError> {
    let org = organization_id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, full_name FROM employees
                 WHERE organization_id = ?1 AND is_active = 1
                 ORDER BY full_name, id",
            )?;
            let rows = stmt.query_map(params![org], |row| {
                Ok(Employee {
                    id: row.get(0)?,
                    full_name: row.get(1)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Latest dated exam per active employee, expiring on or before `until`.
///
/// Employees holding an exam without expiry are never returned.
pub async fn expiring_medical_exams(
    db: &Database,
    organization_id: &OrganizationId,
    until: NaiveDate,
) -> Result<Vec<MedicalExamRecord>, VigilError> {
    let org = organization_id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.employee_id, e.full_name, m.exam_type, MAX(m.expiry_date) AS latest
                 FROM medical_exams m
                 JOIN employees e ON e.id = m.employee_id
                 WHERE m.organization_id = ?1
                   AND e.is_active = 1
                   AND m.expiry_date IS NOT NULL
                   AND NOT EXISTS (
                       SELECT 1 FROM medical_exams p
                       WHERE p.employee_id = m.employee_id AND p.expiry_date IS NULL
                   )
                 GROUP BY m.employee_id
                 HAVING latest <= ?2
                 ORDER BY latest, e.full_name",
            )?;
            let rows = stmt.query_map(params![org, until], |row| {
                Ok(MedicalExamRecord {
                    id: row.get(0)?,
                    employee_id: row.get(1)?,
                    employee_name: row.get(2)?,
                    exam_type: row.get(3)?,
                    expiry_date: row.get(4)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Employees with at least one exam valid on `today` (or never expiring).
pub async fn employees_with_valid_medical_exam(
    db: &Database,
    organization_id: &OrganizationId,
    today: NaiveDate,
) -> Result<HashSet<String>, VigilError> {
    let org = organization_id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT employee_id FROM medical_exams
                 WHERE organization_id = ?1
                   AND (expiry_date IS NULL OR expiry_date >= ?2)",
            )?;
            let rows = stmt.query_map(params![org, today], |row| row.get::<_, String>(0))?;
            rows.collect::<Result<HashSet<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Latest dated record of `kind` per active employee, expiring on or before `until`.
pub async fn expiring_trainings(
    db: &Database,
    organization_id: &OrganizationId,
    kind: TrainingKind,
    until: NaiveDate,
) -> Result<Vec<TrainingRecord>, VigilError> {
    let org = organization_id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.employee_id, e.full_name, t.course_name, MAX(t.expiry_date) AS latest
                 FROM trainings t
                 JOIN employees e ON e.id = t.employee_id
                 WHERE t.organization_id = ?1
                   AND t.kind = ?2
                   AND e.is_active = 1
                   AND t.expiry_date IS NOT NULL
                   AND NOT EXISTS (
                       SELECT 1 FROM trainings p
                       WHERE p.employee_id = t.employee_id AND p.kind = t.kind
                         AND p.expiry_date IS NULL
                   )
                 GROUP BY t.employee_id
                 HAVING latest <= ?3
                 ORDER BY latest, e.full_name",
            )?;
            let rows = stmt.query_map(params![org, kind.as_ref(), until], |row| {
                Ok(TrainingRecord {
                    id: row.get(0)?,
                    employee_id: row.get(1)?,
                    employee_name: row.get(2)?,
                    kind,
                    course_name: row.get(3)?,
                    expiry_date: row.get(4)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Employees with at least one record of `kind` valid on `today`.
pub async fn employees_with_valid_training(
    db: &Database,
    organization_id: &OrganizationId,
    kind: TrainingKind,
    today: NaiveDate,
) -> Result<HashSet<String>, VigilError> {
    let org = organization_id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT employee_id FROM trainings
                 WHERE organization_id = ?1 AND kind = ?2
                   AND (expiry_date IS NULL OR expiry_date >= ?3)",
            )?;
            let rows = stmt.query_map(params![org, kind.as_ref(), today], |row| {
                row.get::<_, String>(0)
            })?;
            rows.collect::<Result<HashSet<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Active equipment whose `check` date falls on or before `until`.
pub async fn expiring_equipment(
    db: &Database,
    organization_id: &OrganizationId,
    check: EquipmentCheck,
    until: NaiveDate,
) -> Result<Vec<EquipmentRecord>, VigilError> {
    let org = organization_id.as_str().to_string();
    let sql = match check {
        EquipmentCheck::Verification => {
            "SELECT id, name, serial_number, next_verification_date FROM equipment
             WHERE organization_id = ?1 AND is_active = 1
               AND next_verification_date IS NOT NULL AND next_verification_date <= ?2
             ORDER BY next_verification_date, name"
        }
        EquipmentCheck::Authorization => {
            "SELECT id, name, serial_number, authorization_expiry_date FROM equipment
             WHERE organization_id = ?1 AND is_active = 1
               AND authorization_expiry_date IS NOT NULL AND authorization_expiry_date <= ?2
             ORDER BY authorization_expiry_date, name"
        }
    };
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params![org, until], |row| {
                Ok(EquipmentRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    serial_number: row.get(2)?,
                    check,
                    due_date: row.get(3)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
