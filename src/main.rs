fn main() {
    tomcat_launcher_lib::run()
}
