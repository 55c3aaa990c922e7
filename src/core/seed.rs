//! Demo accounts installed at startup
//!
//! Twenty-eight people, each the initial holder of one checking and one loan
//! account, numbered 1001 to 1056. The first holder listed is the initial
//! holder.

use crate::types::{Account, AccountKind, AccountNumber, Amount};

use crate::types::AccountKind::{Checking, Loan};

type SeedRow = (AccountNumber, AccountKind, &'static [&'static str], Amount);

const SEED_ACCOUNTS: &[SeedRow] = &[
    (1001, Checking, &["Alice", "Jason", "David"], 2100),
    (1002, Loan, &["Alice", "Jason", "David"], -300),
    (1003, Checking, &["Bob", "Ivan", "Kevin"], 3500),
    (1004, Loan, &["Bob", "Ivan", "Paul"], -900),
    (1005, Checking, &["Charlie", "Dave"], 9100),
    (1006, Loan, &["Charlie", "Dave", "Gary"], -3200),
    (1007, Checking, &["Dave", "Thomas", "Henry"], 200),
    (1008, Loan, &["Dave", "James", "Gary"], -300),
    (1009, Checking, &["Frank", "Grace", "Charlie"], 4000),
    (1010, Loan, &["Frank", "Adam", "Steven"], -900),
    (1011, Checking, &["Grace", "Adam", "Heidi"], 3000),
    (1012, Loan, &["Grace", "Robert", "Larry"], -100),
    (1013, Checking, &["Heidi", "Mark", "Kate"], 500),
    (1014, Loan, &["Heidi", "Ivan", "Dave"], -200),
    (1015, Checking, &["Ivan", "Charlie", "Bob"], 5000),
    (1016, Loan, &["Ivan", "Michael", "Mark"], -2100),
    (1017, Checking, &["John", "Raymond", "Dave"], 6200),
    (1018, Loan, &["John", "Frank", "Justin"], -2000),
    (1019, Checking, &["Kate", "Kevin", "Justin"], 5200),
    (1020, Loan, &["Kate", "Thomas", "James"], -1800),
    (1021, Checking, &["James", "John", "Grace"], 8700),
    (1022, Loan, &["James", "Larry", "Alice"], -700),
    (1023, Checking, &["Michael", "Jason", "Eve"], 7400),
    (1024, Loan, &["Michael", "Ivan", "Gary"], -4900),
    (1025, Checking, &["Robert", "Frank", "Grace"], 8400),
    (1026, Loan, &["Robert", "Ivan", "Justin"], -400),
    (1027, Checking, &["William", "Alice", "Heidi"], 6600),
    (1028, Loan, &["William", "Justin", "Henry"], -5000),
    (1029, Checking, &["David", "Raymond", "Bob"], 2400),
    (1030, Loan, &["David", "Kate", "Mark"], -200),
    (1031, Checking, &["Thomas", "Charlie", "Dave"], 8700),
    (1032, Loan, &["Thomas", "Grace", "Robert"], -2900),
    (1033, Checking, &["Mark", "Steven", "Justin"], 7800),
    (1034, Loan, &["Mark", "Paul", "Bob"], -5900),
    (1035, Checking, &["Steven", "Grace", "William"], 2400),
    (1036, Loan, &["Steven", "David", "Justin"], -1900),
    (1037, Checking, &["Paul", "Charlie", "Steven"], 7800),
    (1038, Loan, &["Paul", "Eve", "Dave"], -2500),
    (1039, Checking, &["Kevin", "Kate", "Larry"], 4400),
    (1040, Loan, &["Kevin", "Ivan", "James"], -800),
    (1041, Checking, &["Jason", "Adam", "Henry"], 1400),
    (1042, Loan, &["Jason", "Raymond", "William"], -200),
    (1043, Checking, &["Gary", "Larry", "Ivan"], 3400),
    (1044, Loan, &["Gary", "Frank", "James"], -900),
    (1045, Checking, &["Larry", "Frank", "Heidi"], 5400),
    (1046, Loan, &["Larry", "William", "David"], -300),
    (1047, Checking, &["Justin", "John", "Dave"], 3400),
    (1048, Loan, &["Justin", "Charlie", "Alice"], -1500),
    (1049, Checking, &["Raymond", "Henry", "James"], 9400),
    (1050, Loan, &["Raymond", "Steven", "Mark"], -6900),
    (1051, Checking, &["Adam", "Charlie", "Michael"], 5400),
    (1052, Loan, &["Adam", "Larry", "Jason"], -4600),
    (1053, Checking, &["Henry", "Henry", "James"], 8300),
    (1054, Loan, &["Henry", "Steven", "Mark"], -1800),
    (1055, Checking, &["Eve", "Michael", "Justin"], 2200),
    (1056, Loan, &["Eve", "William", "Alice"], -400),
];

/// Build the demo accounts with empty histories
pub fn seed_accounts() -> Vec<Account> {
    SEED_ACCOUNTS
        .iter()
        .map(|&(number, kind, holders, balance)| {
            Account::new(
                number,
                kind,
                holders[0],
                holders.iter().map(|holder| holder.to_string()).collect(),
                balance,
            )
        })
        .collect()
}
