//! Hardcoded seed data used when a workspace has no stored value (or a
//! corrupt one) for a collection.

use crate::model::{
    LeaveRequest, LeaveStatus, LeaveType, Role, Transaction, TransactionStatus, TransactionType,
    User, UserStatus,
};

pub const DEFAULT_SCHOOL: &str = "SHRI_HARI";

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "adminpassword";
pub const STAFF_USERNAME: &str = "staff";
pub const STAFF_PASSWORD: &str = "staffpassword";

fn base_user(id: &str, username: &str, name: &str, role: Role) -> User {
    User::new(id, username, name, role, DEFAULT_SCHOOL)
}

fn staff_user(
    id: &str,
    username: &str,
    name: &str,
    email: &str,
    phone: &str,
    department: &str,
    join_date: &str,
    status: UserStatus,
) -> User {
    let mut u = base_user(id, username, name, Role::Staff);
    u.email = Some(email.to_string());
    u.phone = Some(phone.to_string());
    u.department = Some(department.to_string());
    u.join_date = Some(join_date.to_string());
    u.status = Some(status);
    u
}

fn student_user(
    id: &str,
    username: &str,
    name: &str,
    grade: &str,
    section: &str,
    roll_number: &str,
    guardian_name: &str,
    guardian_phone: &str,
    status: UserStatus,
) -> User {
    let mut u = base_user(id, username, name, Role::Student);
    u.grade = Some(grade.to_string());
    u.section = Some(section.to_string());
    u.roll_number = Some(roll_number.to_string());
    u.guardian_name = Some(guardian_name.to_string());
    u.guardian_phone = Some(guardian_phone.to_string());
    u.status = Some(status);
    u
}

/// Built-in administrator identity used by the hardcoded test credentials.
pub fn admin_user() -> User {
    let mut u = base_user("u1", ADMIN_USERNAME, "System Administrator", Role::Admin);
    u.email = Some("admin@shriharischool.edu".to_string());
    u.department = Some("IT & Administration".to_string());
    u
}

/// Built-in staff identity used by the hardcoded test credentials.
pub fn staff_login_user() -> User {
    staff_user(
        "u2",
        STAFF_USERNAME,
        "Sarah Jenkins",
        "sarah.j@shriharischool.edu",
        "+1 (555) 123-4567",
        "Science",
        "2021-08-15",
        UserStatus::Active,
    )
}

pub fn staff_list() -> Vec<User> {
    vec![
        staff_user(
            "s1",
            "r.sharma",
            "Rohit Sharma",
            "r.sharma@school.edu",
            "9876543210",
            "Mathematics",
            "2020-03-10",
            UserStatus::Active,
        ),
        staff_user(
            "s2",
            "p.gupta",
            "Priya Gupta",
            "p.gupta@school.edu",
            "9876543211",
            "English",
            "2019-07-01",
            UserStatus::OnLeave,
        ),
        staff_user(
            "s3",
            "a.singh",
            "Amit Singh",
            "a.singh@school.edu",
            "9876543212",
            "Sports",
            "2022-01-15",
            UserStatus::Active,
        ),
        staff_user(
            "s4",
            "k.verma",
            "Kavita Verma",
            "k.verma@school.edu",
            "9876543213",
            "Science",
            "2018-11-20",
            UserStatus::Inactive,
        ),
    ]
}

pub fn students() -> Vec<User> {
    vec![
        student_user(
            "st1",
            "rohan.das",
            "Rohan Das",
            "X",
            "A",
            "101",
            "Suresh Das",
            "9988776655",
            UserStatus::Active,
        ),
        student_user(
            "st2",
            "priya.k",
            "Priya Kumari",
            "X",
            "A",
            "102",
            "Rajesh Kumar",
            "9988776644",
            UserStatus::Active,
        ),
        student_user(
            "st3",
            "amit.y",
            "Amit Yadav",
            "IX",
            "B",
            "205",
            "Sunil Yadav",
            "9988776633",
            UserStatus::Active,
        ),
        student_user(
            "st4",
            "sneha.r",
            "Sneha Reddy",
            "XI",
            "Science",
            "301",
            "Prakash Reddy",
            "9988776622",
            UserStatus::OnLeave,
        ),
        student_user(
            "st5",
            "vikram.s",
            "Vikram Singh",
            "XII",
            "Commerce",
            "412",
            "Mahendra Singh",
            "9988776611",
            UserStatus::Active,
        ),
    ]
}

fn tx(
    id: &str,
    kind: TransactionType,
    category: &str,
    amount: f64,
    date: &str,
    description: &str,
    status: TransactionStatus,
    payment_method: &str,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        kind,
        category: category.to_string(),
        amount,
        date: date.to_string(),
        description: description.to_string(),
        status,
        payment_method: Some(payment_method.to_string()),
    }
}

pub fn transactions() -> Vec<Transaction> {
    vec![
        tx(
            "t1",
            TransactionType::Income,
            "Tuition Fee",
            25000.0,
            "2024-03-10",
            "Tuition Fee - Class X - Rohan Das",
            TransactionStatus::Completed,
            "Bank Transfer",
        ),
        tx(
            "t2",
            TransactionType::Expense,
            "Maintenance",
            5600.0,
            "2024-03-09",
            "AC Repair - Computer Lab 1",
            TransactionStatus::Completed,
            "Cash",
        ),
        tx(
            "t3",
            TransactionType::Income,
            "Transport Fee",
            12000.0,
            "2024-03-09",
            "Bus Fee Q4 - Route 5 Students",
            TransactionStatus::Completed,
            "UPI",
        ),
        tx(
            "t4",
            TransactionType::Expense,
            "Salary",
            450000.0,
            "2024-03-01",
            "Staff Salaries - February 2024",
            TransactionStatus::Completed,
            "Bank Transfer",
        ),
        tx(
            "t5",
            TransactionType::Expense,
            "Utilities",
            12500.0,
            "2024-03-05",
            "Electricity Bill - Feb 2024",
            TransactionStatus::Pending,
            "Cheque",
        ),
        tx(
            "t6",
            TransactionType::Income,
            "Admission Fee",
            45000.0,
            "2024-03-11",
            "New Admission - Class I (3 Students)",
            TransactionStatus::Completed,
            "Cash",
        ),
    ]
}

fn leave(
    id: &str,
    kind: LeaveType,
    start: &str,
    end: &str,
    reason: &str,
    status: LeaveStatus,
    applied_on: &str,
) -> LeaveRequest {
    LeaveRequest {
        id: id.to_string(),
        user_id: "u2".to_string(),
        kind,
        start_date: start.to_string(),
        end_date: end.to_string(),
        reason: reason.to_string(),
        status,
        applied_on: applied_on.to_string(),
    }
}

pub fn leaves() -> Vec<LeaveRequest> {
    vec![
        leave(
            "l1",
            LeaveType::Sick,
            "2024-02-10",
            "2024-02-12",
            "Viral fever and high temperature",
            LeaveStatus::Approved,
            "2024-02-09",
        ),
        leave(
            "l2",
            LeaveType::Casual,
            "2024-03-05",
            "2024-03-05",
            "Personal banking work",
            LeaveStatus::Pending,
            "2024-03-01",
        ),
        leave(
            "l3",
            LeaveType::Emergency,
            "2023-11-15",
            "2023-11-15",
            "Family emergency",
            LeaveStatus::Approved,
            "2023-11-14",
        ),
        leave(
            "l4",
            LeaveType::Casual,
            "2023-12-24",
            "2023-12-26",
            "Christmas Holidays",
            LeaveStatus::Rejected,
            "2023-12-10",
        ),
    ]
}
