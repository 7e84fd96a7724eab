#![forbid(unsafe_code)]

mod acquisitions;
mod indexes;
mod pragmas;
mod rois;
mod samples;
mod sections;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(pragmas::SQL);
    sql.push_str(samples::SQL);
    sql.push_str(sections::SQL);
    sql.push_str(rois::SQL);
    sql.push_str(acquisitions::SQL);
    sql.push_str(indexes::SQL);
    sql
}
