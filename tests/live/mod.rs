mod harness;
mod read_write_test;
mod spreadsheet_test;
