use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Duration, NaiveDate};
use csv::StringRecord;
use rust_decimal::Decimal;
use tracing::{debug, info};

use tabula_core::{Amount, Balance, Directive, Meta, MetaValue, Posting, Transaction};

use crate::amount::{parse_signed, resolve_amounts, resolve_direction, Direction, MarkerTable};
use crate::categorize::{Categorizer, Identity};
use crate::classify::AccountMap;
use crate::column::{field, non_empty_field, Column, ColumnConfig, IndexConfig};
use crate::config::ImporterConfig;
use crate::dates::{parse_date, parse_time, DateHints};
use crate::error::ImportError;
use crate::file::{Dialect, StatementFile, HEAD_SAMPLE_BYTES};
use crate::normalize::normalize_with_dialect;

const META_FILENAME: &str = "filename";
const META_LINENO: &str = "lineno";
const META_TXN_DATE: &str = "date";
const META_TIME: &str = "time";
const META_CARD: &str = "card";
const META_BALANCE: &str = "balance";

/// A compiled statement importer. Immutable once built, so one instance can
/// serve many files, including from several threads.
pub struct Importer {
    columns: ColumnConfig,
    default_account: String,
    currency: String,
    skip_lines: usize,
    last4_map: BTreeMap<String, String>,
    markers: MarkerTable,
    assets_account: AccountMap,
    debit_account: AccountMap,
    credit_account: AccountMap,
    narration_sep: String,
    close_flag: Option<String>,
    dialect: Dialect,
    dates: DateHints,
    transfer_sep: char,
    allow_zero_amounts: bool,
    flag: char,
    debug: bool,
    categorizer: Box<dyn Categorizer>,
}

impl fmt::Debug for Importer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Importer")
            .field("default_account", &self.default_account)
            .field("currency", &self.currency)
            .field("columns", &self.columns)
            .field("skip_lines", &self.skip_lines)
            .finish_non_exhaustive()
    }
}

/// Settlement dates of the first and last data rows in file order, before
/// any row is dropped.
#[derive(Default)]
struct Endpoints {
    first_date: Option<String>,
    last_date: Option<String>,
}

impl Importer {
    /// Validate `config` and compile its account maps.
    pub fn new(config: ImporterConfig) -> Result<Self, ImportError> {
        if config.default_account.trim().is_empty() {
            return Err(ImportError::MissingDefaultAccount);
        }
        let columns = config.column_config()?;
        config.dialect.validate()?;
        let assets_account = config.assets_account.compile(&config.default_account)?;
        let debit_account = config.debit_account.compile(&config.default_account)?;
        let credit_account = config.credit_account.compile(&config.default_account)?;

        Ok(Importer {
            columns,
            default_account: config.default_account,
            currency: config.currency,
            skip_lines: config.skip_lines,
            last4_map: config.last4_map,
            markers: config.drcr,
            assets_account,
            debit_account,
            credit_account,
            narration_sep: config.narration_sep,
            close_flag: config.close_flag,
            dialect: config.dialect,
            dates: config.dates,
            transfer_sep: config.transfer_sep,
            allow_zero_amounts: config.allow_zero_amounts,
            flag: config.flag,
            debug: config.debug,
            categorizer: Box::new(Identity),
        })
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, ImportError> {
        Self::new(ImporterConfig::from_toml(toml_content)?)
    }

    /// Replace the identity categorizer.
    pub fn with_categorizer(mut self, categorizer: impl Categorizer + 'static) -> Self {
        self.categorizer = Box::new(categorizer);
        self
    }

    pub fn name(&self) -> String {
        format!("tabula.csv: \"{}\"", self.default_account)
    }

    /// The account downloaded files from this source belong to.
    pub fn file_account(&self) -> &str {
        &self.default_account
    }

    /// Whether every configured role resolves against this file's header.
    pub fn identify(&self, file: &StatementFile) -> bool {
        let head = file.head(self.skip_lines, HEAD_SAMPLE_BYTES);
        match normalize_with_dialect(&self.columns, head, &self.dialect) {
            Ok((iconfig, _)) => iconfig.len() == self.columns.len(),
            Err(e) => {
                debug!(file = file.name(), error = %e, "file does not match importer");
                false
            }
        }
    }

    /// The latest settlement date in the file.
    pub fn file_date(&self, file: &StatementFile) -> Result<Option<NaiveDate>, ImportError> {
        let Some((iconfig, records)) = self.data_rows(file)? else {
            return Ok(None);
        };
        let mut max_date: Option<NaiveDate> = None;
        for (lineno, row) in records {
            let row = row?;
            let Some(text) = field(&iconfig, &row, Column::Date) else {
                continue;
            };
            let date = parse_date(text, &self.dates).map_err(|e| e.at_row(lineno))?;
            max_date = max_date.max(Some(date));
        }
        Ok(max_date)
    }

    /// Turn a statement into transactions in ascending date order, followed
    /// by a balance assertion when the statement carries running balances.
    pub fn extract(&self, file: &StatementFile) -> Result<Vec<Directive>, ImportError> {
        let Some((iconfig, records)) = self.data_rows(file)? else {
            return Ok(Vec::new());
        };

        let mut batch: Vec<Transaction> = Vec::new();
        let mut endpoints = Endpoints::default();

        for (lineno, row) in records {
            let row = row?;
            if self.debug {
                debug!(lineno, row = ?row, "statement row");
            }

            if let Some(date_text) = field(&iconfig, &row, Column::Date) {
                if endpoints.first_date.is_none() {
                    endpoints.first_date = Some(date_text.to_string());
                }
                endpoints.last_date = Some(date_text.to_string());
            }

            let Some(txn) = self
                .build_transaction(&iconfig, &row, file.name(), lineno)
                .map_err(|e| e.at_row(lineno))?
            else {
                continue;
            };
            batch.push(self.categorizer.categorize(txn));
        }

        let entries = self.finish(&iconfig, batch, &endpoints);
        info!(
            file = file.name(),
            entries = entries.len(),
            importer = %self.name(),
            "extracted statement"
        );
        Ok(entries)
    }

    /// Resolve the columns and iterate the data rows, numbered from 1 after
    /// the header. Blank and `#` comment rows are left out. `None` when the
    /// file has nothing after its skipped lines.
    fn data_rows<'f>(
        &self,
        file: &'f StatementFile,
    ) -> Result<Option<(IndexConfig, impl Iterator<Item = (usize, csv::Result<StringRecord>)> + 'f)>, ImportError>
    {
        if file.body(self.skip_lines).trim().is_empty() {
            debug!(file = file.name(), "statement has no rows");
            return Ok(None);
        }
        let head = file.head(self.skip_lines, HEAD_SAMPLE_BYTES);
        let (iconfig, has_header) = normalize_with_dialect(&self.columns, head, &self.dialect)?;
        let mut records = file.reader(self.skip_lines, &self.dialect)?.into_records();
        if has_header {
            if let Some(header) = records.next() {
                header?;
            }
        }
        let rows = records
            .enumerate()
            .map(|(index, record)| (index + 1, record))
            .filter(|(_, record)| !record.as_ref().is_ok_and(is_skipped));
        Ok(Some((iconfig, rows)))
    }

    fn build_transaction(
        &self,
        iconfig: &IndexConfig,
        row: &StringRecord,
        filename: &str,
        lineno: usize,
    ) -> Result<Option<Transaction>, ImportError> {
        let get = |column| field(iconfig, row, column);
        let get_text = |column| non_empty_field(iconfig, row, column).map(str::trim);

        if let (Some(close_flag), Some(status)) = (&self.close_flag, get(Column::Status)) {
            if status.trim() == close_flag {
                debug!(lineno, status, "dropping closed row");
                return Ok(None);
            }
        }

        let direction = resolve_direction(iconfig, row, &self.markers);

        let Some(date) = get(Column::Date) else {
            debug!(lineno, "row has no settlement date, skipping");
            return Ok(None);
        };
        let txn_date = get_text(Column::TxnDate);
        let txn_time = get_text(Column::TxnTime);
        let payee = get_text(Column::Payee);
        let narration = [Column::Narration1, Column::Narration2]
            .into_iter()
            .filter_map(get_text)
            .collect::<Vec<_>>()
            .join(&self.narration_sep);
        let remark = get_text(Column::Remark).unwrap_or_default();
        let tag = get_text(Column::Tag);
        let last4 = get_text(Column::Last4);
        let balance = get_text(Column::Balance);

        let mut meta = Meta::new();
        meta.insert(META_FILENAME.to_string(), MetaValue::Text(filename.to_string()));
        meta.insert(META_LINENO.to_string(), MetaValue::Integer(lineno as i64));
        if let Some(txn_date) = txn_date {
            meta.insert(META_TXN_DATE.to_string(), MetaValue::Date(parse_date(txn_date, &self.dates)?));
        }
        if let Some(txn_time) = txn_time {
            let time = parse_time(txn_time)?;
            meta.insert(META_TIME.to_string(), MetaValue::Text(time.format("%H:%M:%S").to_string()));
        }
        if let Some(balance) = balance {
            meta.insert(META_BALANCE.to_string(), MetaValue::Number(parse_signed(balance)?));
        }
        if let Some(last4) = last4 {
            let card = self.last4_map.get(last4).map(String::as_str).unwrap_or(last4);
            meta.insert(META_CARD.to_string(), MetaValue::Text(card.to_string()));
        }

        let mut txn = Transaction {
            meta,
            date: parse_date(date, &self.dates)?,
            flag: self.flag,
            payee: payee.map(str::to_string),
            narration: if remark.is_empty() {
                narration.clone()
            } else {
                format!("{narration}({remark})")
            },
            tags: tag.map(|t| BTreeSet::from([t.to_string()])).unwrap_or_default(),
            postings: Vec::new(),
        };

        let (debit, credit) = resolve_amounts(iconfig, row, direction, self.allow_zero_amounts)?;
        if debit.is_none() && credit.is_none() {
            debug!(lineno, "row moves no money, skipping");
            return Ok(None);
        }

        let payee_narration = format!("{}{}", payee.unwrap_or_default(), narration);
        for number in [debit, credit].into_iter().flatten() {
            self.post(&mut txn, direction, number, remark, &payee_narration);
        }

        Ok(Some(txn))
    }

    fn post(&self, txn: &mut Transaction, direction: Direction, number: Decimal, remark: &str, payee_narration: &str) {
        let units = Amount::new(number, self.currency.clone());
        match direction {
            Direction::Uncertain => match split_transfer(remark, self.transfer_sep) {
                Some((source, destination)) => {
                    let primary = self.assets_account.classify(destination);
                    let secondary = self.assets_account.classify(source);
                    txn.postings.push(Posting::new(primary, -units));
                    txn.postings.push(Posting::inferred(secondary));
                }
                None => txn.postings.push(Posting::new(self.default_account.as_str(), units)),
            },
            Direction::Debit | Direction::Credit => {
                let primary = self.assets_account.classify(remark);
                txn.postings.push(Posting::new(primary, units));

                let counter = if direction == Direction::Credit {
                    &self.credit_account
                } else {
                    &self.debit_account
                };
                txn.postings.push(Posting::inferred(counter.classify(payee_narration)));
            }
        }
    }

    /// Put the batch in ascending order, append the closing balance and strip
    /// the per-row balances.
    fn finish(
        &self,
        iconfig: &IndexConfig,
        mut batch: Vec<Transaction>,
        endpoints: &Endpoints,
    ) -> Vec<Directive> {
        let parse = |text: &Option<String>| text.as_deref().and_then(|t| parse_date(t, &self.dates).ok());
        if let (Some(first), Some(last)) = (parse(&endpoints.first_date), parse(&endpoints.last_date)) {
            // Exports are newest first unless the dates say otherwise.
            if first >= last {
                debug!(%first, %last, "statement is newest first, reversing");
                batch.reverse();
            }
        }

        let closing = if iconfig.contains_key(&Column::Balance) {
            batch.last().and_then(|txn| self.closing_balance(txn))
        } else {
            None
        };

        for txn in &mut batch {
            txn.meta.remove(META_BALANCE);
        }

        let mut entries: Vec<Directive> = batch.into_iter().map(Directive::Transaction).collect();
        entries.extend(closing.map(Directive::Balance));
        entries
    }

    fn closing_balance(&self, last: &Transaction) -> Option<Balance> {
        let Some(MetaValue::Number(number)) = last.meta.get(META_BALANCE) else {
            return None;
        };
        let meta: Meta = last
            .meta
            .iter()
            .filter(|(key, _)| key.as_str() == META_FILENAME || key.as_str() == META_LINENO)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Balance {
            meta,
            date: last.date + Duration::days(1),
            account: self.default_account.clone(),
            amount: Amount::new(*number, self.currency.clone()),
        })
    }
}

fn is_skipped(row: &StringRecord) -> bool {
    row.iter().all(|cell| cell.is_empty()) || row.get(0).is_some_and(|cell| cell.starts_with('#'))
}

/// `"source-destination"` remarks mark a move between two own accounts.
fn split_transfer(remark: &str, sep: char) -> Option<(&str, &str)> {
    let mut parts = remark.split(sep);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(source), Some(destination), None) => Some((source.trim(), destination.trim())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::AccountRule;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn usd(s: &str) -> Amount {
        Amount::new(dec(s), "USD")
    }

    fn bank_config() -> ImporterConfig {
        let mut cfg = ImporterConfig::new("Assets:Bank:Checking", "USD")
            .column(Column::Date, "Date")
            .column(Column::Payee, "Description")
            .column(Column::AmountDebit, "Debit")
            .column(Column::AmountCredit, "Credit");
        cfg.debit_account.rules = vec![AccountRule::new("COFFEE", "Expenses:Coffee")];
        cfg.credit_account.rules = vec![AccountRule::new("PAYROLL", "Income:Salary")];
        cfg
    }

    fn transactions(entries: &[Directive]) -> Vec<&Transaction> {
        entries.iter().filter_map(Directive::as_transaction).collect()
    }

    #[test]
    fn split_transfer_needs_exactly_two_parts() {
        assert_eq!(split_transfer("招商银行-余额宝", '-'), Some(("招商银行", "余额宝")));
        assert_eq!(split_transfer("a-b-c", '-'), None);
        assert_eq!(split_transfer("no separator", '-'), None);
        assert_eq!(split_transfer("", '-'), None);
    }

    #[test]
    fn comment_and_blank_rows_are_skipped() {
        assert!(is_skipped(&StringRecord::from(vec!["# exported by bank"])));
        assert!(is_skipped(&StringRecord::from(vec!["", ""])));
        assert!(!is_skipped(&StringRecord::from(vec!["2024-01-05", "#1 DINER"])));
    }

    #[test]
    fn debit_row_posts_negative_amount_and_counter_account() {
        let importer = Importer::new(bank_config()).unwrap();
        let file = StatementFile::new(
            "bank.csv",
            "Date,Description,Debit,Credit\n2024-01-05,COFFEE SHOP,4.50,\n",
        );
        let entries = importer.extract(&file).unwrap();
        let txns = transactions(&entries);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].payee.as_deref(), Some("COFFEE SHOP"));
        assert_eq!(
            txns[0].postings,
            vec![
                Posting::new("Assets:Bank:Checking", usd("-4.50")),
                Posting::inferred("Expenses:Coffee"),
            ]
        );
    }

    #[test]
    fn credit_row_uses_credit_map() {
        let importer = Importer::new(bank_config()).unwrap();
        let file = StatementFile::new(
            "bank.csv",
            "Date,Description,Debit,Credit\n2024-01-06,ACME PAYROLL,,1200.00\n2024-01-07,REFUND,,3.00\n",
        );
        let entries = importer.extract(&file).unwrap();
        let txns = transactions(&entries);
        assert_eq!(txns[0].postings[0], Posting::new("Assets:Bank:Checking", usd("1200.00")));
        assert_eq!(txns[0].postings[1], Posting::inferred("Income:Salary"));
        assert_eq!(txns[1].postings[1], Posting::inferred("Assets:Bank:Checking"));
    }

    #[test]
    fn uncertain_transfer_splits_remark() {
        let mut cfg = ImporterConfig::new("Assets:Alipay", "CNY")
            .column(Column::Date, 0)
            .column(Column::Amount, 1)
            .column(Column::DrCr, 2)
            .column(Column::Remark, 3);
        cfg.assets_account.rules = vec![
            AccountRule::new("余额宝", "Assets:Alipay:Yuebao"),
            AccountRule::new("招商银行", "Assets:Bank:CMB"),
        ];
        let importer = Importer::new(cfg).unwrap();
        let file = StatementFile::new(
            "alipay.csv",
            "2024-03-01,100.00,,招商银行-余额宝\n2024-03-02,7.00,,\n2024-03-03,1.00,,x\n",
        );
        let entries = importer.extract(&file).unwrap();
        let txns = transactions(&entries);
        assert_eq!(txns.len(), 3);
        assert_eq!(
            txns[0].postings,
            vec![
                Posting::new("Assets:Alipay:Yuebao", Amount::new(dec("100.00"), "CNY")),
                Posting::inferred("Assets:Bank:CMB"),
            ]
        );
        assert_eq!(txns[0].narration, "(招商银行-余额宝)");
        assert_eq!(
            txns[1].postings,
            vec![Posting::new("Assets:Alipay", Amount::new(dec("-7.00"), "CNY"))]
        );
    }

    #[test]
    fn metadata_is_collected() {
        let mut cfg = ImporterConfig::new("Liabilities:Visa", "USD")
            .column(Column::Date, "Posted")
            .column(Column::TxnDate, "Trans Date")
            .column(Column::TxnTime, "Time")
            .column(Column::Payee, "Merchant")
            .column(Column::Narration1, "Category")
            .column(Column::Narration2, "Memo")
            .column(Column::Tag, "Tag")
            .column(Column::Last4, "Card")
            .column(Column::AmountDebit, "Charge")
            .column(Column::AmountCredit, "Payment");
        cfg.last4_map.insert("1234".to_string(), "Visa Gold".to_string());
        let importer = Importer::new(cfg).unwrap();
        let file = StatementFile::new(
            "visa.csv",
            "Posted,Trans Date,Time,Merchant,Category,Memo,Tag,Card,Charge,Payment\n\
             2024-01-06,2024-01-05,1:45 PM, Corner Cafe ,Dining, latte ,trip,1234,4.50,\n\
             2024-01-08,2024-01-07,09:00,Books,Shopping,,,9999,12.00,\n",
        );
        let entries = importer.extract(&file).unwrap();
        let txns = transactions(&entries);
        let first = txns[0];
        assert_eq!(first.date, date(2024, 1, 6));
        assert_eq!(first.payee.as_deref(), Some("Corner Cafe"));
        assert_eq!(first.narration, "Dining; latte");
        assert_eq!(first.tags, BTreeSet::from(["trip".to_string()]));
        assert_eq!(first.meta.get("date"), Some(&MetaValue::Date(date(2024, 1, 5))));
        assert_eq!(first.meta.get("time"), Some(&MetaValue::Text("13:45:00".to_string())));
        assert_eq!(first.meta.get("card"), Some(&MetaValue::Text("Visa Gold".to_string())));
        assert_eq!(first.meta.get("lineno"), Some(&MetaValue::Integer(1)));
        assert_eq!(first.meta.get("filename"), Some(&MetaValue::Text("visa.csv".to_string())));

        let second = txns[1];
        assert_eq!(second.narration, "Shopping");
        assert!(second.tags.is_empty());
        assert_eq!(second.meta.get("card"), Some(&MetaValue::Text("9999".to_string())));
    }

    #[test]
    fn close_flag_drops_row() {
        let mut cfg = bank_config().column(Column::Status, "Status");
        cfg.close_flag = Some("CANCELLED".to_string());
        let importer = Importer::new(cfg).unwrap();
        let file = StatementFile::new(
            "bank.csv",
            "Date,Description,Debit,Credit,Status\n\
             2024-01-05,COFFEE SHOP,4.50,,POSTED\n\
             2024-01-06,DOUBLE CHARGE,4.50,,CANCELLED\n\
             2024-01-07,BAKERY,3.25,,POSTED\n",
        );
        let entries = importer.extract(&file).unwrap();
        let payees: Vec<_> = transactions(&entries)
            .iter()
            .map(|t| t.payee.clone().unwrap_or_default())
            .collect();
        assert_eq!(payees, vec!["COFFEE SHOP", "BAKERY"]);
    }

    #[test]
    fn empty_file_gives_empty_batch() {
        let importer = Importer::new(bank_config().column(Column::Balance, "Balance")).unwrap();
        assert!(importer.extract(&StatementFile::new("empty.csv", "")).unwrap().is_empty());
        assert!(importer.extract(&StatementFile::new("blank.csv", "\n\n")).unwrap().is_empty());

        let header_only = StatementFile::new("header.csv", "Date,Description,Debit,Credit,Balance\n");
        assert!(importer.extract(&header_only).unwrap().is_empty());
    }

    #[test]
    fn bad_date_aborts_with_row_number() {
        let importer = Importer::new(bank_config()).unwrap();
        let file = StatementFile::new(
            "bank.csv",
            "Date,Description,Debit,Credit\n2024-01-05,COFFEE SHOP,4.50,\nsoon,BAKERY,3.25,\n",
        );
        let err = importer.extract(&file).unwrap_err();
        match err {
            ImportError::Row { line, source } => {
                assert_eq!(line, 2);
                assert!(matches!(*source, ImportError::InvalidDate(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn categorizer_runs_on_every_transaction() {
        let importer = Importer::new(bank_config())
            .unwrap()
            .with_categorizer(|mut txn: Transaction| {
                txn.tags.insert("imported".to_string());
                txn
            });
        let file = StatementFile::new(
            "bank.csv",
            "Date,Description,Debit,Credit\n2024-01-05,COFFEE SHOP,4.50,\n2024-01-06,BAKERY,3.25,\n",
        );
        let entries = importer.extract(&file).unwrap();
        assert!(transactions(&entries).iter().all(|t| t.tags.contains("imported")));
    }

    #[test]
    fn identify_and_file_date() {
        let importer = Importer::new(bank_config()).unwrap();
        let file = StatementFile::new(
            "bank.csv",
            "Date,Description,Debit,Credit\n2024-03-01,COFFEE SHOP,4.50,\n2024-02-20,BAKERY,3.25,\n",
        );
        assert!(importer.identify(&file));
        assert_eq!(importer.file_date(&file).unwrap(), Some(date(2024, 3, 1)));
        assert_eq!(importer.file_account(), "Assets:Bank:Checking");
        assert_eq!(importer.name(), "tabula.csv: \"Assets:Bank:Checking\"");

        let other = StatementFile::new(
            "other.csv",
            "When,What,Amount\n2024-03-01,COFFEE SHOP,4.50\n2024-03-02,BAKERY,13.25\n",
        );
        assert!(!importer.identify(&other));
    }

    #[test]
    fn debug_output_names_the_account() {
        let importer = Importer::new(bank_config()).unwrap();
        let text = format!("{importer:?}");
        assert!(text.starts_with("Importer {"));
        assert!(text.contains("Assets:Bank:Checking"));
        assert!(text.ends_with(".. }"));
    }

    #[test]
    fn same_day_rows_are_read_newest_first() {
        let importer = Importer::new(bank_config()).unwrap();
        let file = StatementFile::new(
            "bank.csv",
            "Date,Description,Debit,Credit\n2024-01-05,BAKERY,3.25,\n2024-01-05,COFFEE SHOP,4.50,\n",
        );
        let entries = importer.extract(&file).unwrap();
        let payees: Vec<_> = transactions(&entries)
            .iter()
            .map(|t| t.payee.clone().unwrap_or_default())
            .collect();
        assert_eq!(payees, vec!["COFFEE SHOP", "BAKERY"]);
    }

    #[test]
    fn rows_are_split_with_configured_dialect() {
        let mut cfg = ImporterConfig::new("Assets:Bank:Checking", "EUR")
            .column(Column::Date, "Datum")
            .column(Column::Payee, "Name; Ort")
            .column(Column::Amount, "Betrag");
        cfg.dialect = Dialect {
            delimiter: ';',
            quote: '\'',
        };
        let importer = Importer::new(cfg).unwrap();
        let file = StatementFile::new(
            "konto.csv",
            "Datum;'Name; Ort';Betrag\n2024-02-01;'Bäcker; Berlin';3.20\n2024-02-02;Kiosk;1.10\n",
        );
        assert!(importer.identify(&file));
        let entries = importer.extract(&file).unwrap();
        let txns = transactions(&entries);
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].payee.as_deref(), Some("Bäcker; Berlin"));
        assert_eq!(
            txns[0].postings,
            vec![Posting::new("Assets:Bank:Checking", Amount::new(dec("-3.20"), "EUR"))]
        );
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut cfg = bank_config();
        cfg.debit_account.rules.push(AccountRule::new("[", "Expenses:Broken"));
        assert!(matches!(Importer::new(cfg), Err(ImportError::InvalidPattern { .. })));

        let cfg = ImporterConfig::new(" ", "USD");
        assert!(matches!(Importer::new(cfg), Err(ImportError::MissingDefaultAccount)));
    }
}
