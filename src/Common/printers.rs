use nalgebra::{DMatrix, DVector};
use prettytable::{Table, row};

/// Jacobian entries as (row, column, value), followed by the right-hand side and the update.
pub fn linear_system_tables(
    jacobian: &DMatrix<f64>,
    rhs: &DVector<f64>,
    dx: &DVector<f64>,
) -> (Table, Table) {
    let mut jacobian_table = Table::new();
    jacobian_table.add_row(row!["RowID", "ColID", "Value"]);
    for i in 0..jacobian.nrows() {
        for j in 0..jacobian.ncols() {
            jacobian_table.add_row(row![i, j, format!("{:.16e}", jacobian[(i, j)])]);
        }
    }

    let mut vector_table = Table::new();
    vector_table.add_row(row!["RowID", "Right-hand side", "Delta update"]);
    for i in 0..rhs.len() {
        let delta = dx.get(i).copied().unwrap_or(f64::NAN);
        vector_table.add_row(row![
            i,
            format!("{:.16e}", rhs[i]),
            format!("{:.16e}", delta)
        ]);
    }
    (jacobian_table, vector_table)
}

pub fn print_linear_system(jacobian: &DMatrix<f64>, rhs: &DVector<f64>, dx: &DVector<f64>) {
    let (jacobian_table, vector_table) = linear_system_tables(jacobian, rhs, dx);
    println!("Jacobian matrix:");
    jacobian_table.printstd();
    println!("System right-hand side and update:");
    vector_table.printstd();
}

/// table of species names and concentrations; missing names fall back to the index
pub fn concentration_table(names: &[&str], concentration: &DVector<f64>) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Species", "Concentration"]);
    for (i, c) in concentration.iter().enumerate() {
        let name = names.get(i).map(|s| s.to_string()).unwrap_or(i.to_string());
        table.add_row(row![name, format!("{:.10e}", c)]);
    }
    table
}
